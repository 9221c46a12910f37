//! Parallel self-play simulator for the Orbway board game.
//!
//! Spawns N worker threads each running full games between the configured
//! agents, pushes every finished game into the selected rating backend and
//! renders a rolling status line until a termination signal or the game
//! limit stops the run.

mod app;
mod config;
mod stats;

use clap::Parser;

use crate::config::Cli;

fn main() {
    let cli = Cli::parse();
    match app::Application::new(cli).and_then(|mut app| app.run()) {
        Ok(()) => {}
        Err(error) => {
            eprintln!();
            eprintln!("*** ERROR: {error:#} ***");
            eprintln!();
            eprintln!("Run with --help for the full option list.");
            std::process::exit(1);
        }
    }
}
