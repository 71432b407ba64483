pub const MIN_PASSWORD_LEN: usize = 6;

/// Per-field feedback. Empty fields are never flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFeedback {
    Empty,
    Valid,
    Invalid,
}

impl FieldFeedback {
    fn from_check(value: &str, valid: impl FnOnce(&str) -> bool) -> Self {
        if value.is_empty() {
            Self::Empty
        } else if valid(value) {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // At least one dot with something on either side of it.
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(idx, _)| idx > 0 && idx + 1 < domain.len())
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_name(name: &str) -> bool {
    !name.trim().is_empty()
}

pub fn email_feedback(email: &str) -> FieldFeedback {
    FieldFeedback::from_check(email, validate_email)
}

pub fn password_feedback(password: &str) -> FieldFeedback {
    FieldFeedback::from_check(password, validate_password)
}

/// First problem with a login submission, if any.
pub fn check_login_form(email: &str, password: &str) -> Option<String> {
    if !validate_email(email) {
        return Some("Please enter a valid email address".to_string());
    }
    if !validate_password(password) {
        return Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    None
}

/// First problem with a registration submission, if any.
pub fn check_register_form(name: &str, email: &str, password: &str) -> Option<String> {
    if !validate_name(name) {
        return Some("Please enter your name".to_string());
    }
    check_login_form(email, password)
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
