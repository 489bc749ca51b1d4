use super::*;

fn test_client(base_url: &str) -> PhylloClient {
    PhylloClient::with_base_url("id", "secret", 30, base_url)
        .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_segments_to_root() {
    let client = test_client("https://api.getphyllo.com");
    let url = client.endpoint(&["v1", "users", "u-1", "accounts"]);
    assert_eq!(url.as_str(), "https://api.getphyllo.com/v1/users/u-1/accounts");
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let client = test_client("http://localhost:8080/phyllo/");
    let url = client.endpoint(&["v1", "token"]);
    assert_eq!(url.as_str(), "http://localhost:8080/phyllo/v1/token");
}

#[test]
fn endpoint_encodes_ids() {
    let client = test_client("https://api.getphyllo.com");
    let url = client.endpoint(&["v1", "accounts", "a/b?c"]);
    assert_eq!(url.as_str(), "https://api.getphyllo.com/v1/accounts/a%2Fb%3Fc");
}

#[test]
fn token_url_is_under_v1() {
    let client = test_client("https://api.getphyllo.com/");
    assert_eq!(client.token_url.as_str(), "https://api.getphyllo.com/v1/token");
}

#[test]
fn rejects_non_http_base_url() {
    let err = PhylloClient::with_base_url("id", "secret", 30, "mailto:ops@example.com")
        .expect_err("mailto is not a valid base");
    assert!(matches!(err, PhylloError::InvalidBaseUrl(_)));
}

#[test]
fn rejects_unparseable_base_url() {
    let err = PhylloClient::with_base_url("id", "secret", 30, "not a url")
        .expect_err("garbage should be rejected");
    assert!(matches!(err, PhylloError::InvalidBaseUrl(_)));
}
