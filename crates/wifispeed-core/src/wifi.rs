//! Wireless-link sampler.
//!
//! Reads the current association (SSID, BSSID, channel), signal strength,
//! noise floor and last transmit rate from the macOS `airport -I` utility.
//! Every failure degrades to blank fields: this module never returns an
//! error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::AIRPORT_INFO_FLAG;
use crate::platform::{locate_utility_in_env, run_command};

/// Normalized wireless-link reading.
///
/// String fields are empty when unknown, numeric fields are `None`; a zero
/// is always a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WifiRecord {
    pub ssid: String,
    pub bssid: String,
    pub channel: String,
    /// Received signal strength, dBm.
    pub rssi: Option<i64>,
    /// Noise floor, dBm.
    pub noise: Option<i64>,
    /// `rssi - noise`, dB. Present only when both inputs are and the
    /// difference fits.
    pub snr: Option<i64>,
    /// Last transmit rate, Mbit/s.
    pub tx_rate: Option<f64>,
}

/// Anything that can produce a [`WifiRecord`].
pub trait WifiSampler {
    /// Take one reading. Must not fail; unknown fields stay blank.
    fn sample(&self) -> WifiRecord;
}

/// [`WifiSampler`] backed by the `airport` command-line utility.
#[derive(Debug, Clone)]
pub struct AirportSampler {
    candidates: Vec<String>,
}

impl AirportSampler {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Resolve the utility against the current `PATH`.
    pub fn locate(&self) -> Option<PathBuf> {
        locate_utility_in_env(&self.candidates)
    }
}

impl WifiSampler for AirportSampler {
    fn sample(&self) -> WifiRecord {
        match self.locate() {
            Some(utility) => sample_with_utility(&utility),
            None => {
                log::info!("airport utility not found; wireless fields left blank");
                WifiRecord::default()
            }
        }
    }
}

/// Invoke `utility -I` and parse its output.
pub fn sample_with_utility(utility: &Path) -> WifiRecord {
    log::debug!("reading link status from {}", utility.display());
    match run_command(utility, &[AIRPORT_INFO_FLAG]) {
        Some(text) => parse_airport_output(&text),
        None => WifiRecord::default(),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `key: value` lines into a map.
///
/// Each line is split on its first colon and both halves are trimmed, so
/// values such as a BSSID keep their own colons. Lines without a colon are
/// ignored; the last occurrence of a repeated key wins.
pub fn parse_key_values(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Parse `airport -I` output.
///
/// ```text
///      agrCtlRSSI: -56
///     agrCtlNoise: -90
///      lastTxRate: 866
///           BSSID: a1:b2:c3:d4:e5:f6
///            SSID: MyWifi
///         channel: 36,80
/// ```
pub fn parse_airport_output(text: &str) -> WifiRecord {
    let fields = parse_key_values(text);
    let get = |key: &str| fields.get(key).map(String::as_str);

    let rssi = parse_int(get("agrCtlRSSI"));
    let noise = parse_int(get("agrCtlNoise"));
    let snr = match (rssi, noise) {
        (Some(r), Some(n)) => r.checked_sub(n),
        _ => None,
    };

    WifiRecord {
        ssid: get("SSID").unwrap_or_default().to_string(),
        bssid: get("BSSID").unwrap_or_default().to_string(),
        channel: get("channel").unwrap_or_default().to_string(),
        rssi,
        noise,
        snr,
        tx_rate: parse_float(get("lastTxRate")),
    }
}

/// Best-effort integer coercion. Anything unparsable is absent.
pub fn parse_int(value: Option<&str>) -> Option<i64> {
    value?.trim().parse().ok()
}

/// Best-effort float coercion. Anything unparsable is absent.
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}
