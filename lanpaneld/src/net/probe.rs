use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use anyhow::{Context, Result};
use tokio::process::Command;
use crate::config::ProbeConfig;

/// A reachability target, distinguished by syntax alone: strings that parse
/// as IP literals get an echo probe, everything else gets an HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Addr(IpAddr),
    Named(String),
}

impl Target {
    /// Total and deterministic: every string maps to exactly one variant.
    pub fn classify(raw: &str) -> Self {
        match raw.parse::<IpAddr>() {
            Ok(addr) => Self::Addr(addr),
            Err(_) => Self::Named(raw.to_string()),
        }
    }
}

/// Result of a single probe. `Error` means "could not tell", which callers
/// collapse to offline at the boundary but keep distinct for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable,
    Error(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Port for reachability checks, so orchestration and button rendering can
/// be tested with scripted probes.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_online(&self, target: &str) -> bool;
}

/// Performs one reachability check per call: an ICMP echo via the system
/// `ping` binary for address literals, an HTTP GET for everything else.
/// Stateless and reentrant; no retries, that policy belongs to the caller.
#[derive(Clone)]
pub struct Prober {
    http: reqwest::Client,
    ping_timeout_secs: u64,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to build HTTP probe client")?;

        Ok(Self {
            http,
            ping_timeout_secs: config.ping_timeout_secs,
        })
    }

    /// Run a single probe against a target string. Never fails: transport
    /// and spawn problems are reported as `ProbeOutcome::Error`.
    pub async fn check(&self, target: &str) -> ProbeOutcome {
        match Target::classify(target) {
            Target::Addr(addr) => self.echo_probe(addr).await,
            Target::Named(raw) => self.http_probe(&probe_url(&raw)).await,
        }
    }

    async fn echo_probe(&self, addr: IpAddr) -> ProbeOutcome {
        let family = if addr.is_ipv6() { "-6" } else { "-4" };
        let wait = self.ping_timeout_secs.to_string();

        let status = Command::new("ping")
            .args([family, "-c", "1", "-W", &wait, &addr.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => ProbeOutcome::Reachable,
            Ok(_) => ProbeOutcome::Unreachable,
            // Missing binary, missing privilege: treat as offline, not fatal
            Err(e) => ProbeOutcome::Error(format!("ping {}: {}", addr, e)),
        }
    }

    async fn http_probe(&self, url: &str) -> ProbeOutcome {
        match self.http.get(url).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => ProbeOutcome::Reachable,
            Ok(resp) => {
                tracing::debug!("Probe {} answered {}", url, resp.status());
                ProbeOutcome::Unreachable
            }
            Err(e) => ProbeOutcome::Error(format!("GET {}: {}", url, e)),
        }
    }
}

#[async_trait]
impl Probe for Prober {
    async fn is_online(&self, target: &str) -> bool {
        let outcome = self.check(target).await;
        if let ProbeOutcome::Error(reason) = &outcome {
            tracing::debug!("Probe {} failed: {}", target, reason);
        }
        outcome.is_reachable()
    }
}

/// Named targets without an explicit scheme are probed over plain HTTP.
fn probe_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}
