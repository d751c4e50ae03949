//! Command dispatch.

pub mod clients;
pub mod config_cmd;
pub mod sync;
pub mod util;

use xui_api::XuiClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    cmd: Command,
    client: &XuiClient,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => login(client, profile, global).await,
        Command::Clients(args) => clients::handle(client, args, profile, global).await,
        Command::Sync(args) => sync::handle(client, args, profile, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

async fn login(client: &XuiClient, profile: &str, global: &GlobalOpts) -> Result<(), CliError> {
    match client.login().await {
        Ok(_) => {
            if !global.quiet {
                eprintln!("✓ Logged in to {}", client.base_url());
            }
            Ok(())
        }
        Err(xui_api::Error::Authentication { .. }) => Err(CliError::AuthFailed {
            profile: profile.to_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}
