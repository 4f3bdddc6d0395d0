use super::*;

#[test]
fn validate_credentials_trims_email() {
    assert_eq!(
        validate_credentials("  chef@example.com ", "pw"),
        Ok(("chef@example.com".to_owned(), "pw".to_owned()))
    );
}

#[test]
fn validate_credentials_rejects_blank_or_malformed() {
    assert_eq!(validate_credentials("", "pw"), Err("Enter both email and password."));
    assert_eq!(validate_credentials("chef@example.com", ""), Err("Enter both email and password."));
    assert_eq!(validate_credentials("chef", "pw"), Err("Enter a valid email address."));
}

#[test]
fn mode_toggles_and_labels() {
    assert_eq!(AuthMode::SignIn.toggled(), AuthMode::SignUp);
    assert_eq!(AuthMode::SignUp.toggled(), AuthMode::SignIn);
    assert_eq!(AuthMode::SignIn.submit_label(false), "Sign In");
    assert_eq!(AuthMode::SignUp.submit_label(false), "Sign Up");
    assert_eq!(AuthMode::SignUp.submit_label(true), "Please wait...");
    assert_eq!(AuthMode::SignIn.title(), "Admin Login");
}
