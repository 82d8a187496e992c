pub mod cli;
pub mod core;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod inspect;
pub mod models;
pub mod preflight;
pub mod recommend;
pub mod settings;
pub mod storage;
pub mod workflow;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
