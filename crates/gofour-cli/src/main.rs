//! `gofour`: play N-in-a-row locally, or host games for remote players.
//!
//! # Modes
//!
//! - `text` (default): prints the grid and reads column numbers from stdin
//! - `terminal`: full-screen UI driven by the arrow keys
//! - `server`: WebSocket server; grid flags are ignored since each game is
//!   configured by the client that creates it
//!
//! # Logging
//!
//! `RUST_LOG` takes precedence over `--log-level`. Logs go to stderr, at
//! `warn` by default for the interactive modes and `info` for the server.

mod render;
mod terminal;
mod text;

use std::error::Error;
use std::io::{self, IsTerminal};

use clap::{Parser, ValueEnum};
use gofour_engine::{
    Four, GameConfig, DEFAULT_COLUMNS, DEFAULT_PLAYERS, DEFAULT_ROWS, DEFAULT_WIN,
};
use gofour_server::{GoFourServer, DEFAULT_BIND_ADDR};
use tracing_subscriber::EnvFilter;

use crate::text::TextRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Text,
    Terminal,
    Server,
}

/// Generalized Connect Four
#[derive(Parser, Debug)]
#[command(name = "gofour")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of columns
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    cols: usize,

    /// Number of rows
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Number of players (1 to 7)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PLAYERS)]
    players: usize,

    /// Pieces in a row needed to win
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIN)]
    win: usize,

    /// How to play
    #[arg(short, long, value_enum, default_value_t = Mode::Text)]
    mode: Mode,

    /// Address to listen on in server mode
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    addr: String,

    /// Log filter when RUST_LOG is unset (e.g. "debug", "gofour_server=trace")
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig::new(self.cols, self.rows, self.players, self.win)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = match args.mode {
        Mode::Server => "info",
        Mode::Text | Mode::Terminal => "warn",
    };
    init_tracing(args.log_level.as_deref().unwrap_or(default_level));

    match args.mode {
        Mode::Text => {
            let mut four = Four::new(args.game_config())?;
            let color = io::stdout().is_terminal();
            TextRuntime::new(io::stdin().lock(), io::stdout().lock())
                .with_color(color)
                .run(&mut four)?;
        }
        Mode::Terminal => {
            let four = Four::new(args.game_config())?;
            terminal::run(four)?;
        }
        Mode::Server => serve(&args.addr)?,
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs the WebSocket server until Ctrl-C.
fn serve(addr: &str) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let server = GoFourServer::builder().bind(addr).build().await?;
        tracing::info!(addr = %server.local_addr()?, "listening");

        tokio::select! {
            result = server.run() => result?,
            _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
        }
        Ok::<(), Box<dyn Error>>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_classic_game() {
        let args = Args::try_parse_from(["gofour"]).unwrap();
        assert_eq!(args.mode, Mode::Text);
        assert_eq!(args.game_config(), GameConfig::default());
        assert_eq!(args.addr, "127.0.0.1:8080");
        assert!(args.log_level.is_none());
    }

    #[test]
    fn test_short_flags() {
        let args =
            Args::try_parse_from(["gofour", "-p", "3", "-w", "5", "-m", "terminal", "--cols", "9"])
                .unwrap();
        assert_eq!(args.mode, Mode::Terminal);
        assert_eq!(args.game_config(), GameConfig::new(9, 6, 3, 5));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Args::try_parse_from(["gofour", "--mode", "gui"]).is_err());
    }
}
