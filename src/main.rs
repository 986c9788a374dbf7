use std::io::stdout;

use anyhow::{Context, Result};
use clap::Parser;

mod config;
mod engine;
mod error;
mod slide48;
mod store;
mod tui;

use config::Cli;
use engine::session::Session;
use slide48::Slide48;
use tui::crossterm::{Crossterm, CrosstermEvents};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging()
        .with_context(|| format!("unable to log to {:?}", cli.log_file))?;

    let store = cli
        .store()
        .with_context(|| format!("unable to open score store {:?}", cli.scores))?;
    let session = Session::new(cli.rng(), store, cli.win_policy)?;

    let renderer = Crossterm::new(stdout()).context("unable to take over the terminal")?;
    let slide48 = Slide48::new(session, renderer, CrosstermEvents);
    let session = slide48.run()?;

    println!(
        "score {} (best {}) after {} turns, largest tile {}{}",
        session.score(),
        session.best(),
        session.turns(),
        session.grid().max_tile(),
        if session.has_won() { ", you won!" } else { "" }
    );
    Ok(())
}
