#![forbid(unsafe_code)]

use clap::Parser;
use guestpark_os::{ParkingService, ServiceSettings};
use guestpark_tools::parking_cli::{execute_parking_command, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let settings = ServiceSettings::from_env();
    let service =
        ParkingService::from_settings(&settings).map_err(|e| format!("startup failed: {e}"))?;
    let output = execute_parking_command(&service, &cli.command, cli.json)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
