//! Session commands: whoami, login, register, logout, auth, callback.

use secrecy::SecretString;
use serde::Serialize;
use solvr_core::{AuthOutcome, Identity, OAuthProvider, RegisterRequest, SessionController};

use crate::cli::{AuthArgs, CallbackArgs, GlobalOpts, LoginArgs, ProviderArg, RegisterArgs};
use crate::error::CliError;
use crate::output::{self, highlight};

fn describe(user: &Identity) -> String {
    let mut line = user.display_name.clone();
    if let Some(ref username) = user.username {
        line.push_str(&format!(" (@{username})"));
    }
    if user.is_agent() {
        line.push_str(" [agent]");
    }
    line
}

fn print_identity(user: &Identity, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render(global.output, user, |u| format!("Signed in as {}", describe(u)))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn signed_in_user(session: &SessionController) -> Result<std::sync::Arc<Identity>, CliError> {
    session.current_user().ok_or(CliError::NotSignedIn)
}

fn read_password(given: Option<String>) -> Result<SecretString, CliError> {
    let password = match given {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

pub fn whoami(session: &SessionController, global: &GlobalOpts) -> Result<(), CliError> {
    print_identity(&*signed_in_user(session)?, global)
}

pub async fn login(
    args: LoginArgs,
    session: &SessionController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = read_password(args.password)?;
    match session.login_with_password(&args.email, &password).await {
        AuthOutcome::Success => print_identity(&*signed_in_user(session)?, global),
        AuthOutcome::Failed { message } => Err(CliError::AuthFailed { message }),
    }
}

pub async fn register(
    args: RegisterArgs,
    session: &SessionController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let request = RegisterRequest {
        email: args.email,
        username: args.username,
        display_name: args.display_name,
        password: read_password(args.password)?,
    };
    match session.register(&request).await {
        AuthOutcome::Success => print_identity(&*signed_in_user(session)?, global),
        AuthOutcome::Failed { message } => Err(CliError::AuthFailed { message }),
    }
}

pub fn logout(session: &SessionController, global: &GlobalOpts) {
    session.logout();
    output::print_output("Signed out", global.quiet);
}

#[derive(Serialize)]
struct Redirect<'a> {
    provider: String,
    url: &'a str,
}

pub fn provider(
    args: &AuthArgs,
    session: &SessionController,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let provider = match args.provider {
        ProviderArg::Github => OAuthProvider::Github,
        ProviderArg::Google => OAuthProvider::Google,
    };
    let url = session.login_with_provider(provider)?;

    let redirect = Redirect {
        provider: provider.to_string(),
        url: url.as_str(),
    };
    let out = output::render(global.output, &redirect, |r| {
        format!(
            "Sign in with {} at {}\nThen run: solvr callback --token <TOKEN>",
            r.provider,
            highlight(r.url, color)
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Serialize)]
struct Completed<'a> {
    user: &'a Identity,
    return_to: &'a str,
}

pub async fn callback(
    args: CallbackArgs,
    session: &SessionController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let destination = session
        .complete_provider_login(SecretString::from(args.token))
        .await?;
    let user = signed_in_user(session)?;

    let completed = Completed {
        user: &user,
        return_to: &destination,
    };
    let out = output::render(global.output, &completed, |c| {
        format!("Signed in as {}, returning to {}", describe(c.user), c.return_to)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
