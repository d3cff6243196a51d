//! Process-wide settings, passed explicitly into the orchestrator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Directory (under `$HOME`) that holds the log.
pub const LOG_DIR_NAME: &str = "WiFiSpeedLogger";

/// File name of the CSV log inside [`LOG_DIR_NAME`].
pub const LOG_FILE_NAME: &str = "logs.csv";

/// Where the macOS `airport` utility may live, in lookup order. The last
/// entry is a bare name resolved through `PATH` (for user symlinks).
pub const AIRPORT_CANDIDATES: &[&str] = &[
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport",
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/A/Resources/airport",
    "airport",
];

/// Flag asking `airport` for the current association info.
pub const AIRPORT_INFO_FLAG: &str = "-I";

// ---------------------------------------------------------------------------
// Speed test defaults
// ---------------------------------------------------------------------------

pub const SPEEDTEST_CONFIG_URL: &str = "https://www.speedtest.net/speedtest-config.php";
pub const SPEEDTEST_SERVERS_URL: &str = "https://www.speedtest.net/api/js/servers?engine=js";

/// Image edge lengths fetched as `random{N}x{N}.jpg` during the download test.
pub const DOWNLOAD_SIZES: &[u32] = &[350, 500, 750, 1000, 1500, 2000];

/// Payload sizes (bytes) posted during the upload test.
pub const UPLOAD_SIZES: &[usize] = &[32_768, 65_536, 131_072, 262_144, 524_288, 1_048_576];

/// Settings for one sampling run.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub log_file_name: String,
    pub airport_candidates: Vec<String>,
    pub speedtest: SpeedtestConfig,
}

impl LoggerConfig {
    /// Production configuration: `~/WiFiSpeedLogger/logs.csv`.
    pub fn from_home() -> Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::with_log_dir(PathBuf::from(home).join(LOG_DIR_NAME)))
    }

    /// Default settings with the log redirected to `log_dir`.
    pub fn with_log_dir(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            log_file_name: LOG_FILE_NAME.to_string(),
            airport_candidates: AIRPORT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            speedtest: SpeedtestConfig::default(),
        }
    }

    /// Full path of the CSV log.
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file_name)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Endpoints and transfer sizes for the speed test.
#[derive(Debug, Clone)]
pub struct SpeedtestConfig {
    pub config_url: String,
    pub servers_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub http_timeout: Duration,
    /// How many of the listed servers get latency-probed.
    pub latency_candidates: usize,
    /// Probes per candidate; latency is their mean.
    pub latency_probes: usize,
    pub download_sizes: Vec<u32>,
    pub upload_sizes: Vec<usize>,
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        Self {
            config_url: SPEEDTEST_CONFIG_URL.to_string(),
            servers_url: SPEEDTEST_SERVERS_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            latency_candidates: 5,
            latency_probes: 3,
            download_sizes: DOWNLOAD_SIZES.to_vec(),
            upload_sizes: UPLOAD_SIZES.to_vec(),
        }
    }
}
