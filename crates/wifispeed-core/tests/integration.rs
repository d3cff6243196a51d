//! Integration tests for wifispeed-core.
//!
//! These exercise the full run:
//! utility lookup → Wi-Fi parse → throughput boundary → CSV append → read back.

use chrono::{DateTime, FixedOffset};
use wifispeed_core::{
    AirportSampler, COLUMNS, Error, LoggerConfig, ThroughputRecord, ThroughputSampler, WifiRecord,
    read_log, run_once, run_once_at,
};

struct Unreachable;

impl ThroughputSampler for Unreachable {
    fn measure(&mut self) -> wifispeed_core::Result<ThroughputRecord> {
        Err(Error::NoServers)
    }
}

struct Measured;

impl ThroughputSampler for Measured {
    fn measure(&mut self) -> wifispeed_core::Result<ThroughputRecord> {
        Ok(ThroughputRecord {
            download: Some(87.654),
            upload: Some(23.456),
            ping: Some(8.25),
            external_ip: "198.51.100.4".to_string(),
            server_name: "Example ISP - Wellington".to_string(),
            server_country: "New Zealand".to_string(),
        })
    }
}

fn fixed_clock() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-18T08:00:00+01:00").unwrap()
}

fn no_airport(config: &LoggerConfig) -> AirportSampler {
    let missing = config.log_dir.join("no-such-airport").display().to_string();
    AirportSampler::new(vec![missing])
}

#[test]
fn every_run_appends_exactly_one_row() {
    let tmp = tempfile::tempdir().unwrap();
    let config = LoggerConfig::with_log_dir(tmp.path().join("WiFiSpeedLogger"));
    let wifi = no_airport(&config);

    for expected in 1..=3 {
        let report = run_once(&config, &wifi, &mut Measured).unwrap();
        assert_eq!(report.header_written, expected == 1);
        assert_eq!(read_log(&config.log_path()).unwrap().len(), expected);
    }

    let text = std::fs::read_to_string(config.log_path()).unwrap();
    assert_eq!(text.lines().next().unwrap(), COLUMNS.join(","));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn missing_utility_and_failed_speedtest_still_log_a_row() {
    let tmp = tempfile::tempdir().unwrap();
    let config = LoggerConfig::with_log_dir(tmp.path());
    let wifi = no_airport(&config);

    let report = run_once_at(&config, fixed_clock, &wifi, &mut Unreachable).unwrap();
    assert!(!report.throughput_measured);

    let text = std::fs::read_to_string(config.log_path()).unwrap();
    let row = text.lines().nth(1).unwrap();
    assert_eq!(row, "2026-10-18T08:00:00+01:00,,,,,,,,,,,,,");
}

#[test]
fn log_round_trips_values_and_column_order() {
    let tmp = tempfile::tempdir().unwrap();
    let config = LoggerConfig::with_log_dir(tmp.path());
    let wifi = no_airport(&config);

    let a = run_once_at(&config, fixed_clock, &wifi, &mut Measured).unwrap();
    let b = run_once_at(&config, fixed_clock, &wifi, &mut Unreachable).unwrap();

    let mut reader = csv::Reader::from_path(config.log_path()).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, COLUMNS);

    let rows = read_log(&config.log_path()).unwrap();
    assert_eq!(rows, vec![a.record, b.record]);
    assert_eq!(rows[0].download, Some(87.654));
    assert_eq!(rows[1].download, None);
}

#[cfg(unix)]
mod with_fake_airport {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("airport");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn wifi_fields_survive_throughput_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let util = write_script(
            tmp.path(),
            "cat <<'EOF'\n     agrCtlRSSI: -50\n    agrCtlNoise: -90\n     lastTxRate: 600\n          BSSID: aa:bb:cc:dd:ee:ff\n           SSID: HomeNet\n        channel: 36,80\nEOF",
        );
        let config = LoggerConfig::with_log_dir(tmp.path().join("logs"));
        let wifi = AirportSampler::new(vec![
            "/definitely/not/here/airport".to_string(),
            util.display().to_string(),
        ]);

        let report = run_once_at(&config, fixed_clock, &wifi, &mut Unreachable).unwrap();
        let rows = read_log(&report.log_path).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(
            WifiRecord {
                ssid: row.ssid.clone(),
                bssid: row.bssid.clone(),
                channel: row.channel.clone(),
                rssi: row.rssi,
                noise: row.noise,
                snr: row.snr,
                tx_rate: row.tx_rate,
            },
            WifiRecord {
                ssid: "HomeNet".to_string(),
                bssid: "aa:bb:cc:dd:ee:ff".to_string(),
                channel: "36,80".to_string(),
                rssi: Some(-50),
                noise: Some(-90),
                snr: Some(40),
                tx_rate: Some(600.0),
            }
        );
        assert!(row.throughput_is_blank());
    }

    #[test]
    fn failing_utility_degrades_to_blank_wifi() {
        let tmp = tempfile::tempdir().unwrap();
        let util = write_script(tmp.path(), "echo 'SSID: nope'\nexit 1");
        let config = LoggerConfig::with_log_dir(tmp.path().join("logs"));
        let wifi = AirportSampler::new(vec![util.display().to_string()]);

        let report = run_once_at(&config, fixed_clock, &wifi, &mut Measured).unwrap();
        assert_eq!(report.record.ssid, "");
        assert_eq!(report.record.rssi, None);
        assert_eq!(report.record.download, Some(87.654));
    }
}
