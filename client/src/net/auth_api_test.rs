use super::*;

fn config() -> BackendConfig {
    BackendConfig::new("https://abcd.supabase.co", "anon-key").unwrap()
}

#[test]
fn endpoint_urls_follow_identity_api_layout() {
    let cfg = config();
    assert_eq!(password_grant_url(&cfg), "https://abcd.supabase.co/auth/v1/token?grant_type=password");
    assert_eq!(refresh_grant_url(&cfg), "https://abcd.supabase.co/auth/v1/token?grant_type=refresh_token");
    assert_eq!(signup_url(&cfg), "https://abcd.supabase.co/auth/v1/signup");
    assert_eq!(logout_url(&cfg), "https://abcd.supabase.co/auth/v1/logout");
}

#[test]
fn parse_signup_body_with_session() {
    let body = serde_json::json!({
        "access_token": "at",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "rt",
        "user": { "id": "u1", "email": "chef@example.com" }
    });
    let session = parse_signup_body(&body, 100).unwrap().unwrap();
    assert_eq!(session.access_token, "at");
    assert_eq!(session.expires_at, Some(3_700));
    assert_eq!(session.user.email.as_deref(), Some("chef@example.com"));
}

#[test]
fn parse_signup_body_without_session_means_confirmation_pending() {
    let body = serde_json::json!({ "id": "u1", "email": "chef@example.com", "confirmation_sent_at": "2026-10-01T00:00:00Z" });
    assert_eq!(parse_signup_body(&body, 100), Ok(None));
}

#[test]
fn parse_signup_body_malformed_session_is_decode_error() {
    let body = serde_json::json!({ "access_token": "at" });
    assert!(matches!(parse_signup_body(&body, 100), Err(BackendError::Decode(_))));
}

#[test]
fn logout_ignores_already_gone_statuses() {
    assert!(logout_status_is_ignorable(401));
    assert!(logout_status_is_ignorable(403));
    assert!(logout_status_is_ignorable(404));
    assert!(!logout_status_is_ignorable(500));
}

#[test]
fn refresh_delay_leaves_margin_before_expiry() {
    assert_eq!(refresh_delay_secs(1_000, 500), 440);
}

#[test]
fn refresh_delay_is_at_least_one_second() {
    assert_eq!(refresh_delay_secs(1_000, 990), 1);
    assert_eq!(refresh_delay_secs(1_000, 5_000), 1);
}
