use anyhow::Result;
use clap::Parser;

use grid_converter::cli::Args;
use grid_converter::commands;

fn main() -> Result<()> {
    let args = Args::parse();
    commands::run(args)
}
