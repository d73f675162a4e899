use anyhow::Result;
use clap::Parser;

mod beeper;
mod config;
mod keymap;
mod run;

fn main() -> Result<()> {
    // Machine faults are logged as warnings; keep them visible by default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = config::Config::parse();
    run::run(&config)
}
