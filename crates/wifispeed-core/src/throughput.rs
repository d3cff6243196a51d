//! Throughput record and the failure boundary around measuring it.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::speedtest::SpeedtestResults;

/// Download/upload/latency figures plus who served them.
///
/// Numeric fields are already converted and rounded for the log:
/// Mbit/s to three decimals, milliseconds to two.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputRecord {
    pub download: Option<f64>,
    pub upload: Option<f64>,
    pub ping: Option<f64>,
    pub external_ip: String,
    pub server_name: String,
    pub server_country: String,
}

impl ThroughputRecord {
    /// Convert a raw results summary (bit/s, ms) into log units.
    pub fn from_results(results: &SpeedtestResults) -> Self {
        Self {
            download: Some(bits_to_megabits(results.download)),
            upload: Some(bits_to_megabits(results.upload)),
            ping: resolve_ping(results.ping, results.server.latency),
            external_ip: results.client.ip.clone(),
            server_name: compose_server_name(&results.server.sponsor, &results.server.name),
            server_country: results.server.country.clone(),
        }
    }
}

/// Anything that can measure throughput. Failures are returned, not
/// swallowed; containing them is the caller's job.
pub trait ThroughputSampler {
    fn measure(&mut self) -> Result<ThroughputRecord>;
}

/// Result of running a [`ThroughputSampler`] inside the failure boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ThroughputOutcome {
    Measured(ThroughputRecord),
    /// Measurement failed; carries the error text for diagnostics only.
    Failed(String),
}

impl ThroughputOutcome {
    /// Run `sampler`, turning any error into [`ThroughputOutcome::Failed`].
    pub fn capture(sampler: &mut dyn ThroughputSampler) -> Self {
        match sampler.measure() {
            Ok(record) => Self::Measured(record),
            Err(e) => {
                log::warn!("throughput measurement failed: {e}");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }

    /// The record to log. A failure yields an all-blank record; partial
    /// figures from a failed run are never kept.
    pub fn into_record(self) -> ThroughputRecord {
        match self {
            Self::Measured(record) => record,
            Self::Failed(_) => ThroughputRecord::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// bit/s to Mbit/s, rounded to three decimals.
pub fn bits_to_megabits(bits_per_second: f64) -> f64 {
    round_to(bits_per_second / 1_000_000.0, 3)
}

/// Round to `places` decimals.
///
/// Rounds the exact binary value, ties to even, so `0.125` becomes `0.12`
/// and `1.0005` (stored just below the tie) becomes `1.0`. Non-finite
/// values pass through.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Prefer the summary's ping whenever it is present (zero included); fall
/// back to the best server's latency only when the summary has none.
pub fn resolve_ping(summary_ping: Option<f64>, server_latency: Option<f64>) -> Option<f64> {
    summary_ping.or(server_latency).map(|p| round_to(p, 2))
}

/// `"<sponsor> - <name>"`, with separator residue trimmed when a part is
/// empty.
pub fn compose_server_name(sponsor: &str, name: &str) -> String {
    format!("{sponsor} - {name}")
        .trim_matches(|c| c == ' ' || c == '-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::speedtest::{ClientInfo, Server};

    fn results() -> SpeedtestResults {
        SpeedtestResults {
            download: 87_654_321.0,
            upload: 12_345_678.9,
            ping: Some(14.567),
            server: Server {
                name: "Auckland".to_string(),
                country: "New Zealand".to_string(),
                sponsor: "Example ISP".to_string(),
                latency: Some(20.0),
                ..Server::default()
            },
            client: ClientInfo {
                ip: "203.0.113.7".to_string(),
                isp: "Example ISP".to_string(),
            },
            ..SpeedtestResults::default()
        }
    }

    #[test]
    fn converts_bits_to_megabits() {
        assert_eq!(bits_to_megabits(87_654_321.0), 87.654);
        assert_eq!(bits_to_megabits(0.0), 0.0);
        assert_eq!(bits_to_megabits(1_000_000.0), 1.0);
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(14.567, 2), 14.57);
        assert_eq!(round_to(-3.14159, 2), -3.14);
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn round_to_uses_exact_value_and_ties_to_even() {
        assert_eq!(round_to(2.0625, 3), 2.062);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(87.6545, 3), 87.654);
        assert_eq!(bits_to_megabits(1_000_500.0), 1.0);
    }

    #[test]
    fn record_from_results() {
        let rec = ThroughputRecord::from_results(&results());
        assert_eq!(rec.download, Some(87.654));
        assert_eq!(rec.upload, Some(12.346));
        assert_eq!(rec.ping, Some(14.57));
        assert_eq!(rec.external_ip, "203.0.113.7");
        assert_eq!(rec.server_name, "Example ISP - Auckland");
        assert_eq!(rec.server_country, "New Zealand");
    }

    #[test]
    fn ping_falls_back_to_server_latency_only_when_missing() {
        assert_eq!(resolve_ping(None, Some(21.004)), Some(21.0));
        assert_eq!(resolve_ping(Some(0.0), Some(21.0)), Some(0.0));
        assert_eq!(resolve_ping(Some(9.999), None), Some(10.0));
        assert_eq!(resolve_ping(None, None), None);

        let mut r = results();
        r.ping = None;
        assert_eq!(ThroughputRecord::from_results(&r).ping, Some(20.0));
    }

    #[test]
    fn server_name_trims_missing_parts() {
        assert_eq!(compose_server_name("ISP", "City"), "ISP - City");
        assert_eq!(compose_server_name("", "City"), "City");
        assert_eq!(compose_server_name("ISP", ""), "ISP");
        assert_eq!(compose_server_name("", ""), "");
    }

    struct Fixed(Option<ThroughputRecord>);

    impl ThroughputSampler for Fixed {
        fn measure(&mut self) -> Result<ThroughputRecord> {
            self.0.clone().ok_or(Error::NoServers)
        }
    }

    #[test]
    fn capture_keeps_measured_record() {
        let rec = ThroughputRecord::from_results(&results());
        let outcome = ThroughputOutcome::capture(&mut Fixed(Some(rec.clone())));
        assert!(outcome.is_measured());
        assert_eq!(outcome.into_record(), rec);
    }

    #[test]
    fn capture_turns_error_into_blank_record() {
        let outcome = ThroughputOutcome::capture(&mut Fixed(None));
        assert!(!outcome.is_measured());
        assert!(matches!(&outcome, ThroughputOutcome::Failed(msg) if msg.contains("no servers")));
        assert_eq!(outcome.into_record(), ThroughputRecord::default());
    }
}
