use quill::config::{Config, DEFAULT_API_URL, DEFAULT_PROXY_ADDR};

fn config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        backend_origin: None,
        proxy_addr: DEFAULT_PROXY_ADDR.to_string(),
        toast_secs: 4,
    }
}

#[test]
fn test_config_validation_accepts_defaults() {
    assert!(config(DEFAULT_API_URL).validate().is_ok());
}

#[test]
fn test_config_validation_rejects_non_http_api_url() {
    let err = config("ftp://example.com/api").validate().unwrap_err();
    assert!(err.to_string().contains("QUILL_API_URL"));
}

#[test]
fn test_config_validation_rejects_bad_backend_origin() {
    let mut cfg = config(DEFAULT_API_URL);
    cfg.backend_origin = Some("backend.internal".to_string());
    assert!(cfg.validate().is_err());

    cfg.backend_origin = Some("https://backend.internal".to_string());
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_bad_listen_address() {
    let mut cfg = config(DEFAULT_API_URL);
    cfg.proxy_addr = "localhost".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_toast_lifetime_has_a_floor() {
    let mut cfg = config(DEFAULT_API_URL);
    cfg.toast_secs = 0;
    assert_eq!(cfg.toast_lifetime().as_secs(), 1);
}
