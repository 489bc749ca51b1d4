use creatordb_db::DbError;
use creatordb_phyllo::PhylloError;
use thiserror::Error;

/// Errors returned by [`crate::CreatorService`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// The provider call failed; the provider's message is preserved.
    #[error(transparent)]
    Upstream(#[from] PhylloError),

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for SyncError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => SyncError::NotFound("record not found".to_string()),
            other => SyncError::Db(other),
        }
    }
}

impl SyncError {
    pub(crate) fn creator_not_found(id: impl std::fmt::Display) -> Self {
        SyncError::NotFound(format!("Creator {id} not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_not_found_becomes_not_found() {
        let err: SyncError = DbError::NotFound.into();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[test]
    fn upstream_keeps_provider_message() {
        let err: SyncError = PhylloError::Api {
            status: 422,
            message: "email is invalid".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Phyllo API error (422): email is invalid");
    }
}
