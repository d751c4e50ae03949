mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::io;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use xui_api::XuiClient;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Map `-v` / `-q` onto a log level; `RUST_LOG` wins when set.
fn log_level(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(global)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => {
            print_completions(args.shell);
            Ok(())
        }
        cmd => {
            let (client, profile) = connect(&cli.global)?;
            tracing::debug!(?cmd, %profile, base = %client.base_url(), "running panel command");
            commands::dispatch(cmd, &client, &profile, &cli.global).await
        }
    }
}

/// Resolve the panel for this invocation and build a client for it.
///
/// No network traffic happens here; the first request logs in.
fn connect(global: &GlobalOpts) -> Result<(XuiClient, String), CliError> {
    let (panel, profile) = config::resolve_panel_config(global)?;
    let client = XuiClient::new(panel)?;
    Ok((client, profile))
}

fn print_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_owned();
    clap_complete::generate(shell, &mut cmd, bin, &mut io::stdout());
}
