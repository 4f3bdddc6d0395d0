use super::*;

fn config() -> BackendConfig {
    BackendConfig::new("https://abcd.supabase.co", "anon").unwrap()
}

#[test]
fn key_is_scoped_to_project() {
    assert_eq!(SessionStore::for_project(&config()).key(), "sb-abcd-auth-token");
}

#[test]
fn decode_stored_reads_saved_session() {
    let raw = r#"{"access_token":"at","refresh_token":"rt","expires_at":1700000000,"user":{"id":"u1","email":"chef@example.com"}}"#;
    let session = decode_stored(raw).unwrap();
    assert_eq!(session.access_token, "at");
    assert_eq!(session.expires_at, Some(1_700_000_000));
    assert_eq!(session.user.display_name(), "chef@example.com");
}

#[test]
fn decode_stored_rejects_garbage_and_blank_tokens() {
    assert_eq!(decode_stored("not json"), None);
    assert_eq!(decode_stored(r#"{"access_token":"","user":{"id":"u1"}}"#), None);
}

#[test]
fn off_browser_store_is_empty() {
    let store = SessionStore::for_project(&config());
    store.save(None);
    assert_eq!(store.load(), None);
}
