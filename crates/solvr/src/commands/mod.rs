//! Command dispatch.

mod auth;
mod vote;

use solvr_core::SessionController;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The page each command would run on in the web app. Auth commands sit on
/// auth routes so a rejected password does not also raise the login prompt.
pub fn route_for(cmd: &Command, global: &GlobalOpts) -> String {
    match cmd {
        Command::Auth(args) => match args.next {
            Some(ref next) => format!(
                "/login?next={}",
                url::form_urlencoded::byte_serialize(next.as_bytes()).collect::<String>()
            ),
            None => global.route.clone(),
        },
        Command::Login(_) => "/login".into(),
        Command::Register(_) => "/join".into(),
        Command::Callback(_) => "/auth/callback".into(),
        _ => global.route.clone(),
    }
}

pub async fn dispatch(
    cmd: Command,
    session: &SessionController,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    // Logout is purely local; everything else starts from the stored session.
    if !matches!(cmd, Command::Logout) {
        session.initialize().await;
    }

    match cmd {
        Command::Whoami => auth::whoami(session, global),
        Command::Login(args) => auth::login(args, session, global).await,
        Command::Register(args) => auth::register(args, session, global).await,
        Command::Logout => {
            auth::logout(session, global);
            Ok(())
        }
        Command::Auth(args) => auth::provider(&args, session, global, color),
        Command::Callback(args) => auth::callback(args, session, global).await,
        Command::Vote(args) => vote::cast(args, session, global).await,
        Command::MyVote(args) => vote::mine(&args, session, global).await,
        Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}
