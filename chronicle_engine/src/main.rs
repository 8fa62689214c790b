#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Emberfall Chronicles **
//! A text-driven role-playing game.

use chronicle_engine::style::GameStyle;
use chronicle_engine::{CHRONICLE_VERSION, load_catalogs, run_repl};

use anyhow::{Context, Result};
use log::info;

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading game catalogs...");
    let catalogs = load_catalogs().context("while loading game catalogs")?;
    info!("catalogs loaded successfully");

    println!("{:^72}", "EMBERFALL CHRONICLES".heading_style());
    println!("{:^72}", format!("a tale of swords and sorcery (v{CHRONICLE_VERSION})"));

    run_repl(catalogs)
}
