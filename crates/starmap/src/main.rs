mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use starmap_core::StarmapClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

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
    match cli.command {
        // Config commands don't need a server
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "starmap", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load(&cli.global)?;
            let resolved = config::resolve(&cli.global, &cfg)?;
            tracing::debug!(command = ?cmd, api = %resolved.api_version, "dispatching command");

            match (resolved.server, resolved.provider) {
                (Some(server), provider) => {
                    let client = StarmapClient::new(&server, provider)?;
                    commands::dispatch(cmd, &client, &cli.global).await
                }
                (None, Some(provider)) => {
                    let client = StarmapClient::offline(provider)?;
                    commands::dispatch(cmd, &client, &cli.global).await
                }
                (None, None) => Err(CliError::NoConfig {
                    path: config::active_config_path(&cli.global)
                        .display()
                        .to_string(),
                }),
            }
        }
    }
}
