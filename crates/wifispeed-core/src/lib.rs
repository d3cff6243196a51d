//! # wifispeed-core
//!
//! **One row per run: how good is the Wi-Fi, and how fast is the internet.**
//!
//! `wifispeed-core` samples the current wireless link (SSID, BSSID, channel,
//! RSSI, noise, SNR, tx rate) through the macOS `airport` utility, measures
//! download/upload/latency against speedtest.net, and appends the merged
//! reading to a CSV log.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wifispeed_core::{AirportSampler, LoggerConfig, Speedtest, run_once};
//!
//! let config = LoggerConfig::from_home()?;
//! let mut speedtest = Speedtest::new(config.speedtest.clone())?;
//! let wifi = AirportSampler::new(config.airport_candidates.clone());
//!
//! let report = run_once(&config, &wifi, &mut speedtest)?;
//! println!("logged to {}", report.log_path.display());
//! # Ok::<(), wifispeed_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Wi-Fi sampler + throughput sampler → [`SampleRecord`] → CSV append
//!
//! The Wi-Fi sampler never fails; missing utilities and unparsable values
//! become blank fields. Throughput failures are contained by
//! [`ThroughputOutcome`], so a row is written on every run.

pub mod config;
pub mod error;
pub mod logfile;
pub mod platform;
pub mod record;
pub mod run;
pub mod speedtest;
pub mod throughput;
pub mod wifi;

pub use config::{LoggerConfig, SpeedtestConfig};
pub use error::{Error, Result};
pub use logfile::{AppendOutcome, append_record, ensure_log_dir, read_log};
pub use platform::{locate_utility, run_command};
pub use record::{COLUMNS, SampleRecord, capture_timestamp, format_timestamp};
pub use run::{RunReport, run_once, run_once_at};
pub use speedtest::{ClientInfo, Server, Speedtest, SpeedtestResults};
pub use throughput::{ThroughputOutcome, ThroughputRecord, ThroughputSampler};
pub use wifi::{AirportSampler, WifiRecord, WifiSampler, parse_airport_output};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
