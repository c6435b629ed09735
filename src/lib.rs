pub mod catalog;
pub mod cli;
pub mod compile;
pub mod config;
pub mod diff;
pub mod error;
pub mod fill;
pub mod ids;
pub mod io_utils;
pub mod items;
pub mod normalize;
pub mod rows;
pub mod tree;
pub mod validate;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("form_compiler", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile(args) => compile::execute(&args),
        Commands::Validate(args) => validate::execute(&args),
        Commands::Ids(args) => ids::execute(&args),
        Commands::Diff(args) => diff::execute(&args),
        Commands::Fill(args) => fill::execute(&args),
        Commands::Scenarios(args) => fill::execute_scenarios(&args),
        Commands::Catalog(args) => catalog::execute(&args),
    }
}
