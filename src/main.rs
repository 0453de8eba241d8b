mod app;
mod brush;
mod config;
mod engine;
mod grid;
mod input;
mod kernel;
mod palette;
mod render;
mod rules;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let opts = config::Options::parse();
    app::run(opts)
}
