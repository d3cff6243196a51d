//! One sampling run: prepare, sample, merge, append.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::logfile::{append_record, ensure_log_dir};
use crate::record::{SampleRecord, capture_timestamp};
use crate::throughput::{ThroughputOutcome, ThroughputSampler};
use crate::wifi::WifiSampler;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub record: SampleRecord,
    pub log_path: PathBuf,
    pub header_written: bool,
    /// `false` when the throughput columns were blanked after a failure.
    pub throughput_measured: bool,
}

/// Take one sample and append it to the configured log.
///
/// The throughput measurement runs inside a failure boundary: if it errors,
/// the row is still written with blank throughput columns. Only preparing
/// the directory or writing the row can fail the run.
pub fn run_once(
    config: &LoggerConfig,
    wifi: &dyn WifiSampler,
    throughput: &mut dyn ThroughputSampler,
) -> Result<RunReport> {
    run_once_at(config, capture_timestamp, wifi, throughput)
}

/// [`run_once`] with an injectable clock.
pub fn run_once_at(
    config: &LoggerConfig,
    clock: impl FnOnce() -> DateTime<FixedOffset>,
    wifi: &dyn WifiSampler,
    throughput: &mut dyn ThroughputSampler,
) -> Result<RunReport> {
    ensure_log_dir(config.log_dir())?;

    let timestamp = clock();
    let wifi_record = wifi.sample();
    let outcome = ThroughputOutcome::capture(throughput);
    let throughput_measured = outcome.is_measured();

    let record = SampleRecord::merge(timestamp, wifi_record, outcome.into_record());

    let log_path = config.log_path();
    let appended = append_record(&log_path, &record)?;
    log::info!(
        "logged sample for '{}' to {}",
        record.ssid,
        log_path.display()
    );

    Ok(RunReport {
        record,
        log_path,
        header_written: appended.header_written,
        throughput_measured,
    })
}
