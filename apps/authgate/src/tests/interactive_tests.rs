use super::*;

#[test]
fn parses_login_and_register() {
    assert_eq!(
        parse_command("login a@b.com secret1"),
        Ok(InteractiveCommand::Login {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        })
    );
    assert_eq!(
        parse_command("register Ada Lovelace ada@b.com secret1"),
        Ok(InteractiveCommand::Register {
            name: "Ada Lovelace".to_string(),
            email: "ada@b.com".to_string(),
            password: "secret1".to_string(),
        })
    );
}

#[test]
fn register_requires_a_name() {
    assert!(parse_command("register ada@b.com secret1").is_err());
}

#[test]
fn parses_navigation_and_blank_lines() {
    assert_eq!(parse_command("   "), Ok(InteractiveCommand::Empty));
    assert_eq!(parse_command("show register"), Ok(InteractiveCommand::ShowRegister));
    assert_eq!(parse_command("SHOW login"), Ok(InteractiveCommand::ShowLogin));
    assert_eq!(parse_command("exit"), Ok(InteractiveCommand::Quit));
    assert_eq!(parse_command("dismiss"), Ok(InteractiveCommand::Dismiss));
}

#[test]
fn rejects_unknown_or_incomplete_commands() {
    assert!(parse_command("login a@b.com").is_err());
    assert!(parse_command("show dashboard").is_err());
    assert!(parse_command("logout now").is_err());
    let err = parse_command("frobnicate").expect_err("unknown");
    assert!(err.contains("frobnicate"));
}
