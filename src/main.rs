use std::{io, process::ExitCode};

use clap::Parser;
use log::{error, warn};
use page_sim::{
    config::{Args, SimConfig},
    simulate,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match SimConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load input: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !config.warnings.is_empty() {
        warn!(
            "{} line(s) of {} were ignored",
            config.warnings.len(),
            args.rights.display()
        );
    }

    match simulate(&config, io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Simulation aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
