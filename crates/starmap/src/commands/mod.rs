//! Command dispatch.

pub mod config_cmd;
pub mod entities;
pub mod query;

use starmap_api::Transport;
use starmap_core::StarmapClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a server-backed command to its handler.
pub async fn dispatch<T: Transport>(
    cmd: Command,
    client: &StarmapClient<T>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Query(args) => query::handle(client, args, global).await,
        Command::Policies => entities::list_policies(client, global).await,
        Command::Policy(args) => entities::policy(client, args, global).await,
        Command::Mapping(args) => entities::mapping(client, args, global).await,
        Command::Destination { id } => entities::destination(client, &id, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
