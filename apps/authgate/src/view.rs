//! Text rendering of the three views.

use std::fmt::Write as _;

use client_core::{
    validation::{email_feedback, password_feedback, FieldFeedback},
    Screen, UiSnapshot,
};

pub fn render(snapshot: &UiSnapshot) -> String {
    match snapshot.screen {
        Screen::Login => render_login(snapshot),
        Screen::Register => render_register(snapshot),
        Screen::Dashboard => render_dashboard(snapshot),
    }
}

fn render_login(snapshot: &UiSnapshot) -> String {
    let form = &snapshot.login_form;
    let mut out = String::from("== Sign in ==\n");
    field(&mut out, "Email", &form.email, email_feedback(&form.email));
    field(
        &mut out,
        "Password",
        &mask(&form.password),
        password_feedback(&form.password),
    );
    if snapshot.busy.login {
        out.push_str("Signing in...\n");
    }
    if let Some(message) = &snapshot.login_error {
        let _ = writeln!(out, "! {message}");
    }
    out.push_str("No account yet? `show register`\n");
    out
}

fn render_register(snapshot: &UiSnapshot) -> String {
    let form = &snapshot.register_form;
    let mut out = String::from("== Create account ==\n");
    field(&mut out, "Name", &form.name, FieldFeedback::Empty);
    field(&mut out, "Email", &form.email, email_feedback(&form.email));
    field(
        &mut out,
        "Password",
        &mask(&form.password),
        password_feedback(&form.password),
    );
    if snapshot.busy.register {
        out.push_str("Creating account...\n");
    }
    if let Some(message) = &snapshot.register_error {
        let _ = writeln!(out, "! {message}");
    }
    out.push_str("Already registered? `show login`\n");
    out
}

fn render_dashboard(snapshot: &UiSnapshot) -> String {
    let mut out = String::from("== Dashboard ==\n");
    match &snapshot.profile {
        Some(current) => {
            let _ = writeln!(out, "{:<9} {}", "Name:", current.profile.name);
            let _ = writeln!(out, "{:<9} {}", "Email:", current.profile.email);
            let _ = writeln!(out, "{:<9} {}", "User ID:", current.profile.id);
            let _ = writeln!(
                out,
                "Fetched at {}",
                current.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => out.push_str("Profile not loaded\n"),
    }
    if snapshot.busy.refresh {
        out.push_str("Refreshing...\n");
    }
    if let Some(message) = &snapshot.refresh_feedback {
        let _ = writeln!(out, "* {message}");
    }
    out
}

fn field(out: &mut String, label: &str, value: &str, feedback: FieldFeedback) {
    let marker = match feedback {
        FieldFeedback::Invalid => "  (invalid)",
        FieldFeedback::Empty | FieldFeedback::Valid => "",
    };
    let _ = writeln!(out, "{:<9} {value}{marker}", format!("{label}:"));
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
