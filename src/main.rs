//! aniresolve - resolve anime episodes into playable streams
//!
//! # Usage
//!
//! ```bash
//! aniresolve resolve "/watch/one-piece-100?ep=2142"
//! aniresolve resolve 2142 --dub --json
//! aniresolve episodes /one-piece-100
//! RUST_LOG=aniresolve=debug aniresolve servers 2142
//! ```

mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aniresolve::cli::{Cli, Command, ExitCode, Output};
use aniresolve::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aniresolve={}", cli.log_level())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path).with_env_overrides(),
        None => Config::load(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    config
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let config = load_config(&cli);
    tracing::debug!(base_url = %config.base_url(), "loaded config");

    match cli.command {
        Command::Resolve(cmd) => commands::resolve_cmd(cmd, &config, &output).await,
        Command::Servers(cmd) => commands::servers_cmd(cmd, &config, &output).await,
        Command::Sources(cmd) => commands::sources_cmd(cmd, &config, &output).await,
        Command::Playlist(cmd) => commands::playlist_cmd(cmd, &config, &output).await,
        Command::Episodes(cmd) => commands::episodes_cmd(cmd, &config, &output).await,
    }
}
