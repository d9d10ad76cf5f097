//! Command line and environment configuration.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::driver::DEFAULT_TICK_MILLIS;
use crate::rule_set::RuleSet;

/// Largest grid side accepted on the command line. A `MAX_SIDE` square serializes to just
/// under [`MAX_PAYLOAD`](crate::codec::MAX_PAYLOAD), so any grid the binary creates can be
/// saved and restored.
pub const MAX_SIDE: u16 = 4000;

/// Conway's Game of Life in the terminal
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Grid width in cells
    #[arg(long, env = "LIFE_WIDTH", default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..=i64::from(MAX_SIDE)))]
    pub width: u16,

    /// Grid height in cells
    #[arg(long, env = "LIFE_HEIGHT", default_value_t = 64, value_parser = clap::value_parser!(u16).range(1..=i64::from(MAX_SIDE)))]
    pub height: u16,

    /// Milliseconds between generations, clamped to [10, 1000]
    #[arg(long, env = "LIFE_INTERVAL_MS", default_value_t = DEFAULT_TICK_MILLIS)]
    pub interval_ms: u64,

    /// Life rule in B/S notation
    #[arg(long, env = "LIFE_RULE", default_value = "B3/S23")]
    pub rule: RuleSet,

    /// File the latest state token is written to, and read from on startup
    #[arg(long, env = "LIFE_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// State token to start from. Takes precedence over the state file.
    pub token: Option<String>,
}

impl Config {
    /// The token to restore on startup, if any.
    ///
    /// A missing state file is not an error.
    pub fn initial_token(&self) -> anyhow::Result<Option<String>> {
        if let Some(token) = &self.token {
            return Ok(Some(token.trim().to_owned()));
        }

        let Some(path) = &self.state_file else {
            return Ok(None);
        };

        match fs::read_to_string(path) {
            Ok(s) if s.trim().is_empty() => Ok(None),
            Ok(s) => Ok(Some(s.trim().to_owned())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("reading state file {}", path.display()))
            }
        }
    }
}
