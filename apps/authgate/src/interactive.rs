//! Line-oriented front end: one command per line, view re-rendered after each.

use anyhow::Result;
use client_core::SessionController;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::view;

pub const HELP: &str = "\
commands:
  login <email> <password>
  register <name...> <email> <password>
  logout
  refresh
  show login | show register
  dismiss
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Login { email: String, password: String },
    Register { name: String, email: String, password: String },
    Logout,
    Refresh,
    ShowLogin,
    ShowRegister,
    Dismiss,
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Result<InteractiveCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((head, rest)) = words.split_first() else {
        return Ok(InteractiveCommand::Empty);
    };

    match (head.to_ascii_lowercase().as_str(), rest) {
        ("login", [email, password]) => Ok(InteractiveCommand::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        ("login", _) => Err("usage: login <email> <password>".to_string()),
        ("register", [name @ .., email, password]) if !name.is_empty() => {
            Ok(InteractiveCommand::Register {
                name: name.join(" "),
                email: email.to_string(),
                password: password.to_string(),
            })
        }
        ("register", _) => Err("usage: register <name...> <email> <password>".to_string()),
        ("logout", []) => Ok(InteractiveCommand::Logout),
        ("refresh", []) => Ok(InteractiveCommand::Refresh),
        ("show", ["login"]) => Ok(InteractiveCommand::ShowLogin),
        ("show", ["register"]) => Ok(InteractiveCommand::ShowRegister),
        ("show", _) => Err("usage: show login | show register".to_string()),
        ("dismiss", []) => Ok(InteractiveCommand::Dismiss),
        ("help", _) => Ok(InteractiveCommand::Help),
        ("quit" | "exit", []) => Ok(InteractiveCommand::Quit),
        (other, _) => Err(format!("unknown command '{other}' (try `help`)")),
    }
}

/// Applies one command. Returns `false` when the session should end.
pub async fn apply(controller: &SessionController, command: InteractiveCommand) -> bool {
    // Failures are already recorded on the snapshot for rendering.
    match command {
        InteractiveCommand::Login { email, password } => {
            let _ = controller.login(&email, &password).await;
        }
        InteractiveCommand::Register {
            name,
            email,
            password,
        } => {
            let _ = controller.register(&name, &email, &password).await;
        }
        InteractiveCommand::Logout => controller.logout().await,
        InteractiveCommand::Refresh => {
            if let Err(err) = controller.refresh_profile().await {
                println!("Profile refresh failed: {err}");
            }
        }
        InteractiveCommand::ShowLogin => {
            if !controller.show_login().await {
                println!("Already signed in; `logout` first.");
            }
        }
        InteractiveCommand::ShowRegister => {
            if !controller.show_register().await {
                println!("Already signed in; `logout` first.");
            }
        }
        InteractiveCommand::Dismiss => controller.dismiss_errors().await,
        InteractiveCommand::Help => println!("{HELP}"),
        InteractiveCommand::Quit => return false,
        InteractiveCommand::Empty => {}
    }
    true
}

pub async fn run(controller: &SessionController) -> Result<()> {
    println!("{}", view::render(&controller.snapshot().await));
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        debug!(?command, "interactive command");
        if matches!(command, InteractiveCommand::Help | InteractiveCommand::Empty) {
            apply(controller, command).await;
            continue;
        }
        if !apply(controller, command).await {
            break;
        }
        println!("{}", view::render(&controller.snapshot().await));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/interactive_tests.rs"]
mod tests;
