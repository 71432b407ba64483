use super::*;

#[test]
fn accepts_well_formed_emails() {
    for email in ["a@b.com", "first.last@sub.example.org", "x@y.z"] {
        assert!(validate_email(email), "{email} should be valid");
    }
}

#[test]
fn rejects_malformed_emails() {
    for email in [
        "",
        "plain",
        "@b.com",
        "a@",
        "a@b",
        "a@.com",
        "a@b.",
        "a@@b.com",
        "a@b@c.com",
        "a b@c.com",
    ] {
        assert!(!validate_email(email), "{email:?} should be invalid");
    }
}

#[test]
fn password_needs_minimum_length() {
    assert!(!validate_password("12345"));
    assert!(validate_password("123456"));
    assert!(validate_password("secret1"));
}

#[test]
fn empty_fields_are_not_flagged() {
    assert_eq!(email_feedback(""), FieldFeedback::Empty);
    assert_eq!(password_feedback(""), FieldFeedback::Empty);
    assert_eq!(email_feedback("nope"), FieldFeedback::Invalid);
    assert_eq!(password_feedback("abc"), FieldFeedback::Invalid);
    assert_eq!(email_feedback("a@b.com"), FieldFeedback::Valid);
}

#[test]
fn form_checks_report_first_problem() {
    assert_eq!(check_login_form("a@b.com", "secret1"), None);
    assert_eq!(
        check_login_form("bad", "x").as_deref(),
        Some("Please enter a valid email address")
    );
    assert_eq!(
        check_login_form("a@b.com", "x").as_deref(),
        Some("Password must be at least 6 characters")
    );
    assert_eq!(
        check_register_form("  ", "a@b.com", "secret1").as_deref(),
        Some("Please enter your name")
    );
    assert_eq!(check_register_form("Ada", "a@b.com", "secret1"), None);
}
