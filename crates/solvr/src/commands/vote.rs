//! Vote commands.

use serde::Serialize;
use solvr_core::{
    CoreError, SessionController, VoteController, VoteDirection, VoteOutcome, VoteSeed, VoteState,
};

use crate::cli::{CurrentVoteArg, DirectionArg, GlobalOpts, MyVoteArgs, VoteArgs};
use crate::error::CliError;
use crate::output;

fn direction_label(direction: Option<VoteDirection>) -> &'static str {
    match direction {
        Some(VoteDirection::Up) => "up",
        Some(VoteDirection::Down) => "down",
        None => "none",
    }
}

#[derive(Serialize)]
struct VoteReport<'a> {
    post_id: &'a str,
    #[serde(flatten)]
    state: &'a VoteState,
}

pub async fn cast(
    args: VoteArgs,
    session: &SessionController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let direction = match args.direction {
        DirectionArg::Up => VoteDirection::Up,
        DirectionArg::Down => VoteDirection::Down,
    };
    let seed = match args.current {
        Some(CurrentVoteArg::Up) => VoteSeed::Known(Some(VoteDirection::Up)),
        Some(CurrentVoteArg::Down) => VoteSeed::Known(Some(VoteDirection::Down)),
        Some(CurrentVoteArg::None) => VoteSeed::Known(None),
        None => VoteSeed::Unknown,
    };

    let control = VoteController::new(
        session.api().clone(),
        session,
        args.post_id.as_str(),
        args.score,
        seed,
    );
    control.seeded().await;

    match control.vote(direction).await {
        VoteOutcome::RolledBack { message } => Err(CliError::VoteRejected {
            post_id: args.post_id,
            message,
        }),
        VoteOutcome::Applied | VoteOutcome::Ignored => {
            let state = control.current();
            let report = VoteReport {
                post_id: &args.post_id,
                state: &state,
            };
            let out = output::render(global.output, &report, |r| {
                format!(
                    "Score {} (your vote: {})",
                    r.state.score,
                    direction_label(r.state.direction)
                )
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct MyVote<'a> {
    post_id: &'a str,
    vote: Option<VoteDirection>,
}

pub async fn mine(
    args: &MyVoteArgs,
    session: &SessionController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !session.current().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    let vote = session
        .api()
        .fetch_my_vote(&args.post_id)
        .await
        .map_err(CoreError::from)?;

    let report = MyVote {
        post_id: &args.post_id,
        vote,
    };
    let out = output::render(global.output, &report, |r| {
        direction_label(r.vote).to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
