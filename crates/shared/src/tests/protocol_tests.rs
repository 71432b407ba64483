use super::*;

#[test]
fn parses_auth_response_with_numeric_user_id() {
    let raw = r#"{"token":"T1","user":{"id":7,"name":"Ada","email":"a@b.com"}}"#;
    let parsed: AuthResponse = serde_json::from_str(raw).expect("auth response");
    assert_eq!(parsed.token.as_str(), "T1");
    assert_eq!(parsed.user.id.0, "7");
    assert_eq!(parsed.user.email, "a@b.com");
}

#[test]
fn parses_auth_response_with_string_user_id() {
    let raw = r#"{"token":"T2","user":{"id":"u-42","name":"Bob","email":"bob@example.org"}}"#;
    let parsed: AuthResponse = serde_json::from_str(raw).expect("auth response");
    assert_eq!(parsed.user.id.0, "u-42");
}

#[test]
fn error_body_tolerates_missing_message() {
    let parsed: ErrorBody = serde_json::from_str("{}").expect("error body");
    assert!(parsed.message.is_none());

    let parsed: ErrorBody =
        serde_json::from_str(r#"{"message":"Invalid credentials"}"#).expect("error body");
    assert_eq!(parsed.message.as_deref(), Some("Invalid credentials"));
}

#[test]
fn token_debug_output_is_redacted() {
    let token = Token::new("super-secret");
    assert!(!format!("{token:?}").contains("super-secret"));
}
