//! Runtime configuration for the harness
//!
//! Configuration is resolved from environment variables, optionally
//! overridden by the CLI flags of the test binary. All values are
//! optional except the base URL, which is only required when a real
//! deployment is targeted.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default timeout for driver acquisition and readiness waits.
pub const DEFAULT_DRIVER_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved runtime configuration for a harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the archive deployment under test. Required unless
    /// `simulate` is set.
    pub base_url: Option<String>,

    /// Credentials to authenticate with (default admin/admin).
    pub username: String,
    pub password: String,

    /// Run browsers headless. Presentation-only: never changes
    /// business-state semantics.
    pub headless: bool,

    /// Address of a remote WebDriver grid. Absent means a local driver.
    pub remote_url: Option<String>,

    /// Endpoint of a locally running WebDriver (chromedriver or
    /// geckodriver). Absent means the conventional localhost port.
    pub webdriver_url: Option<String>,

    /// Force the in-process simulated backend.
    pub simulate: bool,

    /// Permit falling back to the simulated backend when an explicitly
    /// requested remote grid is unreachable.
    pub allow_fallback: bool,

    /// Bound on driver acquisition and readiness waits.
    pub driver_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: "admin".to_string(),
            password: "admin".to_string(),
            headless: true,
            remote_url: None,
            webdriver_url: None,
            simulate: false,
            allow_fallback: false,
            driver_timeout: DEFAULT_DRIVER_TIMEOUT,
        }
    }
}

impl HarnessConfig {
    /// Resolve configuration from `NEUROARC_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(url) = non_empty_env("NEUROARC_BASE_URL") {
            cfg.base_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(user) = non_empty_env("NEUROARC_USERNAME") {
            cfg.username = user;
        }
        if let Some(pass) = non_empty_env("NEUROARC_PASSWORD") {
            cfg.password = pass;
        }
        if let Some(headless) = non_empty_env("NEUROARC_HEADLESS") {
            cfg.headless = parse_bool(&headless, true);
        }
        cfg.remote_url = non_empty_env("NEUROARC_REMOTE_URL");
        cfg.webdriver_url = non_empty_env("NEUROARC_WEBDRIVER_URL");
        if let Some(sim) = non_empty_env("NEUROARC_SIMULATE") {
            cfg.simulate = parse_bool(&sim, false);
        }
        if let Some(fallback) = non_empty_env("NEUROARC_ALLOW_FALLBACK") {
            cfg.allow_fallback = parse_bool(&fallback, false);
        }
        cfg
    }

    /// Base URL to hand to page objects. In simulated mode a synthetic
    /// scheme stands in for the missing deployment.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| "mock://neuroarc".to_string())
    }

    /// Validate that a real deployment target is usable.
    pub fn require_base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            Error::Provisioning(
                "base URL must be provided via --base-url or NEUROARC_BASE_URL".to_string(),
            )
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
