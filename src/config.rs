use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rand::rngs::StdRng;
use rand::{thread_rng, RngCore, SeedableRng};

use crate::engine::session::WinPolicy;
use crate::error::Result;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

/// Play 2048 in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// Seed the tile generator for a reproducible game.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// File in which the best score is kept.
    #[arg(long, default_value = "slide48-scores.json")]
    pub(crate) scores: PathBuf,

    /// Keep the best score in memory only.
    #[arg(long, conflicts_with = "scores")]
    pub(crate) no_persist: bool,

    /// Whether reaching 2048 ends the game.
    #[arg(long, value_enum, default_value_t = WinPolicy::Continue)]
    pub(crate) win_policy: WinPolicy,

    /// Where log output goes while the terminal is in use.
    #[arg(long, default_value = "slide48.log")]
    pub(crate) log_file: PathBuf,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<WarnLevel>,
}

impl Cli {
    pub(crate) fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(thread_rng()),
        }
    }

    pub(crate) fn store(&self) -> Result<Box<dyn KeyValueStore>> {
        if self.no_persist {
            return Ok(Box::new(MemoryStore::default()));
        }
        Ok(Box::new(JsonFileStore::open(&self.scores)?))
    }

    /// Send log records to the log file; the terminal belongs to the renderer.
    pub(crate) fn init_logging(&self) -> Result<()> {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {}] {}",
                    record.level(),
                    record.target(),
                    message,
                ))
            })
            .level(self.verbose.log_level_filter())
            .chain(fern::log_file(&self.log_file)?)
            .apply()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["slide48"]);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.scores, PathBuf::from("slide48-scores.json"));
        assert!(!cli.no_persist);
        assert_eq!(cli.win_policy, WinPolicy::Continue);
        assert_eq!(cli.verbose.log_level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "slide48",
            "--seed",
            "9",
            "--no-persist",
            "--win-policy",
            "stop",
            "-vv",
        ]);
        assert_eq!(cli.seed, Some(9));
        assert!(cli.no_persist);
        assert_eq!(cli.win_policy, WinPolicy::Stop);
        assert_eq!(cli.verbose.log_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn seeded_rngs_repeat() {
        let cli = Cli::parse_from(["slide48", "--seed", "3"]);
        assert_eq!(cli.rng().next_u64(), cli.rng().next_u64());
    }

    #[test]
    fn no_persist_uses_memory() -> Result<()> {
        let cli = Cli::parse_from(["slide48", "--no-persist"]);
        let mut store = cli.store()?;
        store.set("k", "v")?;
        assert_eq!(store.get("k")?, Some("v".to_string()));
        Ok(())
    }
}
