//! islet - A static site generator with partial hydration and a search index.

mod asset;
mod cli;
mod compiler;
mod config;
mod error;
mod logger;
mod module;
mod page;
mod partial;
mod search;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{
    Cli,
    build::{run_build, run_search},
};
use compiler::StaticCompiler;
use config::SiteConfig;
use module::FsModuleLoader;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    if cli.is_search() {
        run_search(&config)
    } else {
        run_build(&config, &StaticCompiler, &FsModuleLoader)
    }
}
