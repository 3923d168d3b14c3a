use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sequence::clock::{clock_sequence, ClockOptions};
use shared::protocol::parse_script;
use tracing::{info, warn};
use tracing_subscriber::{filter::ParseError, EnvFilter};

mod config;
mod input;
mod render;
mod session;

use config::load_settings;
use input::spawn_stdin_reader;
use render::Renderer;
use session::run_session;

/// Set a date with a single knob: rotate to adjust, push to select.
#[derive(Parser, Debug)]
#[command(name = "knob")]
struct Cli {
    /// TOML settings file (defaults to ./knob.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a script such as "right,push,right,right,push"
    Replay { actions: String },
    /// Read actions from stdin until EOF
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    let (filter, filter_err) = log_filter(&settings.log_filter);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    if let Some(err) = filter_err {
        warn!(
            filter = %settings.log_filter,
            error = %err,
            "invalid log filter; falling back to info"
        );
    }

    let options = ClockOptions::from_today(settings.start_year, settings.year_span);
    let mut seq = clock_sequence(&options).context("failed to build clock setup sequence")?;
    info!(today = %options.today, year_range = ?options.year_range(), "clock setup ready");

    let mut out = Renderer::new(cli.json, io::stdout().lock());
    match cli.command {
        Command::Replay { actions } => run_session(&mut seq, parse_script(&actions), &mut out),
        Command::Interactive => {
            let rx = spawn_stdin_reader(settings.input_queue_capacity)
                .context("failed to start input reader")?;
            run_session(&mut seq, rx, &mut out)
        }
    }
}

// Falls back to `info`, handing back the parse error so it can be logged.
fn log_filter(raw: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(raw) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_log_filter_is_kept() {
        let (_, err) = log_filter("sequence=debug,warn");
        assert!(err.is_none());
    }

    #[test]
    fn invalid_log_filter_falls_back_and_reports_error() {
        let (_, err) = log_filter("sequence=loudest");
        assert!(err.is_some(), "bad level must surface a parse error");
    }
}
