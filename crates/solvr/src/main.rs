mod cli;
mod commands;
mod error;
mod navigator;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use solvr_config::{Config, StorageBackend};
use solvr_core::SessionController;

use crate::cli::{Cli, Command, GlobalOpts, StorageArg};
use crate::error::CliError;
use crate::navigator::TerminalNavigator;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "solvr", &mut std::io::stdout());
        return Ok(());
    }

    let config = effective_config(&cli.global)?;
    let color = output::should_color(cli.global.color);
    let route = commands::route_for(&cli.command, &cli.global);
    let session = mount_session(&config, &route, color, cli.global.quiet)?;

    tracing::debug!(command = ?cli.command, %route, "dispatching command");
    let result = commands::dispatch(cli.command, &session, &cli.global, color).await;

    // Whatever the command did, surface a login prompt the session raised.
    let prompt = session.auth_modal();
    if prompt.visible {
        output::print_notice(&prompt.message, color);
    }
    result
}

/// Config file + env, then CLI flag overrides.
fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = solvr_config::load_config()?;

    if let Some(ref url) = global.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(storage) = global.storage {
        config.storage = match storage {
            StorageArg::File => StorageBackend::File,
            StorageArg::Keyring => StorageBackend::Keyring,
            StorageArg::Memory => StorageBackend::Memory,
        };
    }
    if global.insecure {
        config.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
    Ok(config)
}

fn mount_session(
    config: &Config,
    route: &str,
    color: bool,
    quiet: bool,
) -> Result<SessionController, CliError> {
    let api = config.to_client_config()?.build_client()?;
    let store = config.open_store()?;
    let navigator = TerminalNavigator::new(route, config.frontend_url()?, color, quiet);
    Ok(SessionController::mount(api, store, Arc::new(navigator)))
}
