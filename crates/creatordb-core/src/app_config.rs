use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which Phyllo environment the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhylloEnvironment {
    Sandbox,
    Production,
}

impl std::fmt::Display for PhylloEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhylloEnvironment::Sandbox => write!(f, "sandbox"),
            PhylloEnvironment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub phyllo_client_id: String,
    pub phyllo_client_secret: String,
    pub phyllo_environment: PhylloEnvironment,
    pub phyllo_base_url: String,
    pub phyllo_enabled_platforms: Vec<String>,
    pub phyllo_webhook_secret: Option<String>,
    pub phyllo_request_timeout_secs: u64,
    pub sync_concurrency: usize,
    pub sync_cron: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("phyllo_client_id", &self.phyllo_client_id)
            .field("phyllo_client_secret", &"[redacted]")
            .field("phyllo_environment", &self.phyllo_environment)
            .field("phyllo_base_url", &self.phyllo_base_url)
            .field("phyllo_enabled_platforms", &self.phyllo_enabled_platforms)
            .field(
                "phyllo_webhook_secret",
                &self.phyllo_webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "phyllo_request_timeout_secs",
                &self.phyllo_request_timeout_secs,
            )
            .field("sync_concurrency", &self.sync_concurrency)
            .field("sync_cron", &self.sync_cron)
            .finish()
    }
}
