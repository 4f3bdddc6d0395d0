use super::*;

#[test]
fn new_trims_trailing_slash_and_whitespace() {
    let cfg = BackendConfig::new(" https://abcd1234.supabase.co/ ", " anon ").unwrap();
    assert_eq!(cfg.url(), "https://abcd1234.supabase.co");
    assert_eq!(cfg.anon_key(), "anon");
}

#[test]
fn new_rejects_non_http_urls() {
    for url in [
        "",
        "abcd.supabase.co",
        "ftp://abcd.supabase.co",
        "https://",
        "https://exa mple.supabase.co",
        "https://abcd.supabase.co?x=1",
        "https://abcd.supabase.co/#frag",
    ] {
        assert_eq!(
            BackendConfig::new(url, "anon"),
            Err(ConfigError::InvalidUrl { url: url.to_owned() }),
            "expected invalid url for {url:?}"
        );
    }
}

#[test]
fn new_rejects_blank_key() {
    assert_eq!(BackendConfig::new("https://abcd.supabase.co", "  "), Err(ConfigError::EmptyAnonKey));
}

#[test]
fn project_ref_is_first_host_label() {
    let cfg = BackendConfig::new("https://abcd1234.supabase.co", "anon").unwrap();
    assert_eq!(cfg.project_ref(), "abcd1234");
    assert_eq!(cfg.session_storage_key(), "sb-abcd1234-auth-token");
}

#[test]
fn project_ref_ignores_port_and_path() {
    let cfg = BackendConfig::new("http://localhost:54321", "anon").unwrap();
    assert_eq!(cfg.project_ref(), "localhost");
}

#[test]
fn project_ref_ignores_credentials() {
    let cfg = BackendConfig::new("https://user@abcd.supabase.co", "anon").unwrap();
    assert_eq!(cfg.project_ref(), "abcd");
    assert_eq!(cfg.session_storage_key(), "sb-abcd-auth-token");
}

#[test]
fn endpoint_joins_under_base_path() {
    let cfg = BackendConfig::new("https://abcd.supabase.co", "anon").unwrap();
    assert_eq!(cfg.endpoint("/rest/v1/menu_items").as_str(), "https://abcd.supabase.co/rest/v1/menu_items");

    let proxied = BackendConfig::new("http://localhost:8000/api/", "anon").unwrap();
    assert_eq!(proxied.url(), "http://localhost:8000/api");
    assert_eq!(proxied.endpoint("/auth/v1/signup").as_str(), "http://localhost:8000/api/auth/v1/signup");
}

#[test]
fn missing_var_message_names_variable() {
    let err = ConfigError::MissingVar { var: "SUPABASE_URL".to_owned() };
    assert_eq!(err.to_string(), "missing configuration: SUPABASE_URL not set");
}
