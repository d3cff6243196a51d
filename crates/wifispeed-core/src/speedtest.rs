//! Minimal blocking speedtest.net client.
//!
//! The measurement sequence is the one the service's own clients use:
//!
//! 1. fetch the client configuration (external IP, ISP),
//! 2. list candidate servers,
//! 3. probe the nearest few for latency and keep the fastest,
//! 4. download test images from it, then upload filler payloads to it,
//! 5. summarise everything as [`SpeedtestResults`].
//!
//! Throughput figures are raw bit/s; [`crate::throughput`] converts them for
//! the log. Transfers run one after another on the calling thread.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::SpeedtestConfig;
use crate::error::{Error, Result};
use crate::throughput::{ThroughputRecord, ThroughputSampler};

/// Latency charged to a failed probe, matching the service's own penalty.
const FAILED_PROBE_PENALTY: Duration = Duration::from_secs(3600);

/// Repeating filler for upload bodies.
const UPLOAD_FILLER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const UPLOAD_PREFIX: &[u8] = b"content1=";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One entry of the server list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub id: String,
    /// Upload endpoint; the other test files live next to it.
    pub url: String,
    pub name: String,
    pub country: String,
    pub cc: String,
    pub sponsor: String,
    pub host: String,
    /// Distance from the client in km, as reported by the service.
    pub distance: Option<f64>,
    /// Measured latency in ms. Only set on the selected best server.
    #[serde(skip_deserializing)]
    pub latency: Option<f64>,
}

impl Server {
    /// Directory URL holding `latency.txt` and the download images.
    pub fn base_url(&self) -> &str {
        let path_start = self.url.find("://").map_or(0, |i| i + 3);
        match self.url[path_start..].rfind('/') {
            Some(idx) => &self.url[..path_start + idx],
            None => &self.url,
        }
    }
}

/// Client details from the service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub ip: String,
    pub isp: String,
}

/// Summary of one measurement, as a serialisable key/value structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedtestResults {
    /// bit/s
    pub download: f64,
    /// bit/s
    pub upload: f64,
    /// Round-trip latency to the selected server in ms. `None` when no
    /// latency figure was recorded, which is different from a zero reading.
    pub ping: Option<f64>,
    pub server: Server,
    pub client: ClientInfo,
    pub timestamp: String,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl SpeedtestResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Stateful speed-test session. Each step fills in part of
/// [`Speedtest::results`].
pub struct Speedtest {
    http: Client,
    config: SpeedtestConfig,
    servers: Vec<Server>,
    best: Option<Server>,
    results: SpeedtestResults,
}

impl Speedtest {
    /// Build the HTTP client. No network traffic happens here; a failure
    /// means the measurement stack itself is unusable.
    pub fn new(config: SpeedtestConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("wifispeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            servers: Vec::new(),
            best: None,
            results: SpeedtestResults::default(),
        })
    }

    /// Fetch the client configuration and record the external IP.
    pub fn get_config(&mut self) -> Result<&ClientInfo> {
        let body = self
            .http
            .get(&self.config.config_url)
            .send()?
            .error_for_status()?
            .text()?;
        self.results.client = parse_client_info(&body)?;
        log::debug!("speed-test client ip {}", self.results.client.ip);
        Ok(&self.results.client)
    }

    /// Fetch the full, unfiltered server list.
    pub fn get_servers(&mut self) -> Result<&[Server]> {
        let body = self
            .http
            .get(&self.config.servers_url)
            .send()?
            .error_for_status()?
            .text()?;
        let servers = parse_servers(&body)?;
        if servers.is_empty() {
            return Err(Error::NoServers);
        }
        log::debug!("speed-test listed {} servers", servers.len());
        self.servers = servers;
        Ok(&self.servers)
    }

    /// Probe the first few listed servers and keep the lowest-latency one.
    pub fn get_best_server(&mut self) -> Result<&Server> {
        if self.servers.is_empty() {
            self.get_servers()?;
        }

        let candidates = self.servers.iter().take(self.config.latency_candidates.max(1));
        let measured: Vec<(Server, f64)> = candidates
            .map(|s| (s.clone(), self.probe_latency(s)))
            .collect();

        let (mut best, latency) = pick_best(measured).ok_or(Error::NoServers)?;
        best.latency = Some(latency);
        log::info!(
            "best server {} ({}) at {latency:.1} ms",
            compose_label(&best),
            best.host
        );

        self.results.ping = Some(latency);
        self.results.server = best.clone();
        Ok(&*self.best.insert(best))
    }

    /// Mean round-trip to `<base>/latency.txt`, in ms.
    fn probe_latency(&self, server: &Server) -> f64 {
        let url = format!("{}/latency.txt", server.base_url());
        let probes = self.config.latency_probes.max(1);
        let total: Duration = (0..probes)
            .map(|_| {
                let start = Instant::now();
                let ok = self
                    .http
                    .get(&url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.text())
                    .map(|t| t.trim_start().starts_with("test=test"))
                    .unwrap_or(false);
                if ok {
                    start.elapsed()
                } else {
                    FAILED_PROBE_PENALTY
                }
            })
            .sum();
        total.as_secs_f64() * 1000.0 / probes as f64
    }

    /// Download test images from the best server. Returns bit/s.
    pub fn download(&mut self) -> Result<f64> {
        let base = self.best_server()?.base_url().to_string();
        let start = Instant::now();
        let mut received: u64 = 0;

        for size in &self.config.download_sizes {
            let url = format!("{base}/random{size}x{size}.jpg");
            let body = self.http.get(&url).send()?.error_for_status()?.bytes()?;
            received += body.len() as u64;
        }

        let bps = bits_per_second(received, start.elapsed());
        self.results.download = bps;
        self.results.bytes_received = received;
        Ok(bps)
    }

    /// Post filler payloads to the best server. Returns bit/s.
    pub fn upload(&mut self) -> Result<f64> {
        let url = self.best_server()?.url.clone();
        let start = Instant::now();
        let mut sent: u64 = 0;

        for &size in &self.config.upload_sizes {
            let body = upload_payload(size);
            let len = body.len() as u64;
            self.http
                .post(&url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body)
                .send()?
                .error_for_status()?;
            sent += len;
        }

        let bps = bits_per_second(sent, start.elapsed());
        self.results.upload = bps;
        self.results.bytes_sent = sent;
        Ok(bps)
    }

    /// Summary of everything measured so far.
    pub fn results(&self) -> &SpeedtestResults {
        &self.results
    }

    fn best_server(&self) -> Result<&Server> {
        self.best.as_ref().ok_or(Error::NoServers)
    }
}

impl ThroughputSampler for Speedtest {
    fn measure(&mut self) -> Result<ThroughputRecord> {
        self.results = SpeedtestResults::default();
        self.best = None;

        self.get_config()?;
        self.get_servers()?;
        self.get_best_server()?;
        self.download()?;
        self.upload()?;
        self.results.timestamp = chrono::Utc::now().to_rfc3339();

        if log::log_enabled!(log::Level::Debug) {
            match self.results.to_json() {
                Ok(summary) => log::debug!("speed-test summary {summary}"),
                Err(e) => log::debug!("speed-test summary not serialisable: {e}"),
            }
        }

        Ok(ThroughputRecord::from_results(&self.results))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowest latency wins; ties keep list order.
pub fn pick_best(measured: Vec<(Server, f64)>) -> Option<(Server, f64)> {
    measured
        .into_iter()
        .reduce(|best, next| if next.1 < best.1 { next } else { best })
}

pub fn bits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / secs
}

/// `content1=` followed by repeating filler, `size` bytes in total.
pub fn upload_payload(size: usize) -> Vec<u8> {
    let mut body = Vec::with_capacity(size.max(UPLOAD_PREFIX.len()));
    body.extend_from_slice(UPLOAD_PREFIX);
    body.extend(UPLOAD_FILLER.iter().cycle().take(size.saturating_sub(UPLOAD_PREFIX.len())));
    body
}

pub fn parse_servers(json: &str) -> Result<Vec<Server>> {
    Ok(serde_json::from_str(json)?)
}

/// Pull `ip` and `isp` out of the `<client …/>` element of the
/// configuration XML.
pub fn parse_client_info(xml: &str) -> Result<ClientInfo> {
    let element = find_element(xml, "client").ok_or(Error::ClientInfo)?;
    let ip = attribute(element, "ip").ok_or(Error::ClientInfo)?;
    Ok(ClientInfo {
        ip,
        isp: attribute(element, "isp").unwrap_or_default(),
    })
}

/// Text of the first `<name …>` start tag, without the angle brackets.
fn find_element<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}");
    let mut from = 0;
    while let Some(pos) = xml[from..].find(&open) {
        let start = from + pos + 1;
        let after = &xml[start + name.len()..];
        if after.starts_with(|c: char| c.is_whitespace() || c == '/' || c == '>') {
            let end = xml[start..].find('>')?;
            return Some(xml[start..start + end].trim_end_matches('/'));
        }
        from = start;
    }
    None
}

fn attribute(element: &str, name: &str) -> Option<String> {
    let needle = format!("{name}=\"");
    let mut from = 0;
    while let Some(pos) = element[from..].find(&needle) {
        let idx = from + pos;
        let boundary = idx == 0
            || element[..idx].ends_with(|c: char| c.is_whitespace());
        let value_start = idx + needle.len();
        if boundary {
            let len = element[value_start..].find('"')?;
            return Some(unescape(&element[value_start..value_start + len]));
        }
        from = value_start;
    }
    None
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn compose_label(server: &Server) -> String {
    crate::throughput::compose_server_name(&server.sponsor, &server.name)
}
