use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert_eq!(cfg.refresh_margin_secs, 30);
    assert!(cfg.token_file.is_none());
    assert_eq!(cfg.freshness, Freshness::default());
}

#[test]
fn from_lookup_parses_overrides_and_trims_trailing_slash() {
    let cfg = ClientConfig::from_lookup(lookup(&[
        ("CHANLENS_API_URL", "https://dash.example.test/api/"),
        ("CHANLENS_REQUEST_TIMEOUT_SECS", "42"),
        ("CHANLENS_CONNECT_TIMEOUT_SECS", " 7 "),
        ("CHANLENS_TOKEN_FILE", "/tmp/chanlens/token.json"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_url, "https://dash.example.test/api");
    assert_eq!(cfg.request_timeout_secs, 42);
    assert_eq!(cfg.connect_timeout_secs, 7);
    assert_eq!(cfg.token_file, Some(PathBuf::from("/tmp/chanlens/token.json")));
}

#[test]
fn from_lookup_ignores_unparseable_numbers() {
    let cfg = ClientConfig::from_lookup(lookup(&[("CHANLENS_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn from_lookup_blank_token_file_is_none() {
    let cfg = ClientConfig::from_lookup(lookup(&[("CHANLENS_TOKEN_FILE", "  ")])).unwrap();
    assert!(cfg.token_file.is_none());
}

#[test]
fn from_lookup_rejects_non_http_url() {
    let err = ClientConfig::from_lookup(lookup(&[("CHANLENS_API_URL", "ftp://x")])).unwrap_err();
    assert!(err.to_string().contains("http://"));
}

#[test]
fn validate_api_url_requires_host() {
    assert!(validate_api_url("https://").is_err());
    assert!(validate_api_url("http://localhost:8000").is_ok());
}

#[test]
fn default_windows_match_resource_policy() {
    let f = Freshness::default();
    assert_eq!(f.balance, Duration::from_secs(60));
    assert_eq!(f.packages, Duration::from_secs(300));
    assert_eq!(f.costs, Duration::from_secs(3600));
    assert_eq!(f.error_reset, Duration::from_secs(60));
}
