//! The persisted sample row.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Timelike};
use serde::{Deserialize, Serialize};

use crate::throughput::ThroughputRecord;
use crate::wifi::WifiRecord;

/// Column header of the log, in persisted order. Must match the field order
/// of [`SampleRecord`].
pub const COLUMNS: [&str; 14] = [
    "timestamp_iso",
    "ssid",
    "bssid",
    "channel",
    "rssi_dbm",
    "noise_dbm",
    "snr_db",
    "tx_rate_mbps",
    "download_mbps",
    "upload_mbps",
    "ping_ms",
    "external_ip",
    "server_name",
    "server_country",
];

/// One log row: timestamp, wireless reading, throughput reading.
///
/// Only `timestamp` is mandatory. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(rename = "timestamp_iso", with = "timestamp_secs")]
    pub timestamp: DateTime<FixedOffset>,
    pub ssid: String,
    pub bssid: String,
    pub channel: String,
    #[serde(rename = "rssi_dbm")]
    pub rssi: Option<i64>,
    #[serde(rename = "noise_dbm")]
    pub noise: Option<i64>,
    #[serde(rename = "snr_db")]
    pub snr: Option<i64>,
    #[serde(rename = "tx_rate_mbps")]
    pub tx_rate: Option<f64>,
    #[serde(rename = "download_mbps")]
    pub download: Option<f64>,
    #[serde(rename = "upload_mbps")]
    pub upload: Option<f64>,
    #[serde(rename = "ping_ms")]
    pub ping: Option<f64>,
    pub external_ip: String,
    pub server_name: String,
    pub server_country: String,
}

impl SampleRecord {
    /// Combine the two readings under one timestamp.
    pub fn merge(
        timestamp: DateTime<FixedOffset>,
        wifi: WifiRecord,
        throughput: ThroughputRecord,
    ) -> Self {
        Self {
            timestamp,
            ssid: wifi.ssid,
            bssid: wifi.bssid,
            channel: wifi.channel,
            rssi: wifi.rssi,
            noise: wifi.noise,
            snr: wifi.snr,
            tx_rate: wifi.tx_rate,
            download: throughput.download,
            upload: throughput.upload,
            ping: throughput.ping,
            external_ip: throughput.external_ip,
            server_name: throughput.server_name,
            server_country: throughput.server_country,
        }
    }

    /// `true` when every throughput column is blank.
    pub fn throughput_is_blank(&self) -> bool {
        self.download.is_none()
            && self.upload.is_none()
            && self.ping.is_none()
            && self.external_ip.is_empty()
            && self.server_name.is_empty()
            && self.server_country.is_empty()
    }
}

/// Current local time with its UTC offset, truncated to whole seconds.
pub fn capture_timestamp() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.with_nanosecond(0).unwrap_or(now)
}

/// RFC 3339 at second precision with a numeric offset,
/// e.g. `2026-10-18T09:30:00+02:00`.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

mod timestamp_secs {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<FixedOffset>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}
