//! CLI for wifispeed — one Wi-Fi + speed-test sample per run.
//!
//! Meant to be invoked by an external scheduler (cron, launchd). Takes no
//! options: every run appends one row to `~/WiFiSpeedLogger/logs.csv`.
//! Diagnostics go through `env_logger`; set `RUST_LOG=info` to see them.

use std::process;

use clap::Parser;
use wifispeed_core::{AirportSampler, LoggerConfig, Speedtest, run_once};

#[derive(Parser)]
#[command(name = "wifispeed")]
#[command(about = "wifispeed — log Wi-Fi link quality and internet throughput, one row per run")]
#[command(version = wifispeed_core::VERSION)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match LoggerConfig::from_home() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // The measurement client is required; without it nothing is sampled.
    let mut speedtest = match Speedtest::new(config.speedtest.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: speed-test client unavailable: {e}");
            process::exit(1);
        }
    };

    let wifi = AirportSampler::new(config.airport_candidates.clone());

    match run_once(&config, &wifi, &mut speedtest) {
        Ok(report) => {
            if !report.throughput_measured {
                log::info!("speed test failed; logged Wi-Fi fields only");
            }
            log::info!("sample written to {}", report.log_path.display());
        }
        Err(e) => {
            eprintln!("Error writing sample: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_takes_no_arguments() {
        assert!(Cli::try_parse_from(["wifispeed"]).is_ok());
        assert!(Cli::try_parse_from(["wifispeed", "--interval", "5"]).is_err());
        assert!(Cli::try_parse_from(["wifispeed", "extra"]).is_err());
    }
}
