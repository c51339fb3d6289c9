//! CLI - Command Line Interface for aniresolve
//!
//! Every command prints JSON-parseable output and exits with a semantic code.
//!
//! # Examples
//!
//! ```bash
//! # Resolve an episode into playable streams
//! aniresolve resolve "/watch/one-piece-100?ep=2142"
//!
//! # Inspect the pipeline step by step
//! aniresolve servers 2142 --dub
//! aniresolve sources 612345
//! aniresolve playlist https://cdn.example/hls/master.m3u8
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::error::ErrorKind;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network or upstream HTTP error
    NetworkError = 3,
    /// Episode or anime not found
    NotFound = 4,
    /// No playable source
    NoStreams = 5,
    /// Response or playlist could not be used
    BadResponse = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> ExitCode {
        match kind {
            ErrorKind::Network | ErrorKind::Remote => ExitCode::NetworkError,
            ErrorKind::Decode | ErrorKind::Format => ExitCode::BadResponse,
            ErrorKind::NotFound => ExitCode::NotFound,
            ErrorKind::NoPlayableSource => ExitCode::NoStreams,
        }
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// aniresolve - resolve anime episodes into playable streams
#[derive(Parser, Debug)]
#[command(
    name = "aniresolve",
    version,
    about = "Resolve anime episodes into ranked, playable streams with subtitles",
    after_help = "EXAMPLES:\n\
                  aniresolve resolve 2142                    Resolve episode 2142\n\
                  aniresolve resolve '/watch/x-100?ep=2142'  Resolve from a watch URL\n\
                  aniresolve episodes /one-piece-100         List episodes\n\
                  aniresolve playlist <url> --json           Expand one master playlist"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging (debug level)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Provider origin (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }

    /// Log filter derived from flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve an episode into playable videos
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// List playback servers for an episode
    #[command(visible_alias = "srv")]
    Servers(ServersCmd),

    /// Show the raw source descriptor of one server
    #[command(visible_alias = "src")]
    Sources(SourcesCmd),

    /// Expand an HLS master playlist into quality variants
    #[command(visible_alias = "pl")]
    Playlist(PlaylistCmd),

    /// List the episodes of an anime
    #[command(visible_alias = "ep")]
    Episodes(EpisodesCmd),
}

/// Resolve an episode reference (id or watch URL with `ep=`)
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Episode id or watch URL
    #[arg(required = true)]
    pub episode: String,

    /// Also resolve DUB servers
    #[arg(long)]
    pub dub: bool,

    /// Maximum number of videos to print
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Servers processed in parallel (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// List playback servers for an episode
#[derive(Args, Debug)]
pub struct ServersCmd {
    /// Episode id or watch URL
    #[arg(required = true)]
    pub episode: String,

    /// Include DUB servers
    #[arg(long)]
    pub dub: bool,
}

/// Fetch one server's source descriptor
#[derive(Args, Debug)]
pub struct SourcesCmd {
    /// Server id from `servers` output
    #[arg(required = true)]
    pub server_id: String,
}

/// Expand a master playlist
#[derive(Args, Debug)]
pub struct PlaylistCmd {
    /// Master playlist URL
    #[arg(required = true)]
    pub url: String,
}

/// List episodes for an anime page
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// Anime page URL or id (e.g. /one-piece-100)
    #[arg(required = true)]
    pub anime: String,

    /// Maximum number of episodes
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            kind: None,
            exit_code: 0,
        }
    }
}

impl JsonOutput<()> {
    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, kind: Option<ErrorKind>, code: ExitCode) -> Self {
        Self {
            data: None,
            error: Some(msg.into()),
            kind,
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            // For non-JSON, caller should handle formatting
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print human-readable lines (falls back to JSON data in JSON mode)
    pub fn print_lines<T: Serialize>(&self, data: T, lines: &[String]) -> anyhow::Result<()> {
        if self.json {
            return self.print(data);
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        self.report(msg.into(), None, code)
    }

    /// Print a resolution error, mapping its kind to an exit code
    pub fn failure(&self, context: &str, err: &crate::error::ResolveError) -> ExitCode {
        let kind = err.kind();
        self.report(format!("{}: {}", context, err), Some(kind), kind.into())
    }

    fn report(&self, msg: String, kind: Option<ErrorKind>, code: ExitCode) -> ExitCode {
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, kind, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
