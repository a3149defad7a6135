//! Session provisioning
//!
//! The [`Provisioner`] turns a [`HarnessConfig`] into an active
//! [`Session`] using one of three strategies: a local WebDriver, a
//! remote grid, or the in-process simulation. Strategy resolution is a
//! pure function of the configuration, so it is testable without
//! touching the network.

use std::sync::Arc;
use std::time::Duration;

use fantoccini::ClientBuilder;
use serde_json::json;
use tracing::{info, warn};

use neuroarc_common::{Error, HarnessConfig, Result};
use neuroarc_mock::MockStore;

use crate::driver::{UiDriver, WebDriverUi};
use crate::simulated::SimulatedUi;

/// Conventional endpoint of a locally running chromedriver/geckodriver.
pub const DEFAULT_LOCAL_WEBDRIVER: &str = "http://localhost:4444";

/// How a session's driver is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStrategy {
    /// WebDriver running on this machine.
    Local,
    /// Remote Selenium-compatible grid.
    Remote,
    /// In-process simulation over the mock backend.
    Simulated,
}

impl std::fmt::Display for DriverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriverStrategy::Local => "local",
            DriverStrategy::Remote => "remote",
            DriverStrategy::Simulated => "simulated",
        };
        f.write_str(name)
    }
}

/// Resolve the provisioning strategy for a configuration.
///
/// An explicit simulation request or a missing deployment URL selects
/// the simulation; otherwise a configured grid address selects the
/// remote strategy and a local driver is the default.
pub fn resolve_strategy(config: &HarnessConfig) -> DriverStrategy {
    if config.simulate || config.base_url.is_none() {
        DriverStrategy::Simulated
    } else if config.remote_url.is_some() {
        DriverStrategy::Remote
    } else {
        DriverStrategy::Local
    }
}

/// An active UI session: a driver plus the context scenarios need.
pub struct Session {
    pub strategy: DriverStrategy,
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Principal logged in through this session, set by the login page.
    pub principal: Option<String>,
    /// Name of the last entity a page confirmed on screen.
    pub last_extracted: Option<String>,
    driver: Box<dyn UiDriver>,
    closed: bool,
}

impl Session {
    pub fn driver(&mut self) -> &mut dyn UiDriver {
        self.driver.as_mut()
    }

    pub fn is_simulated(&self) -> bool {
        self.strategy == DriverStrategy::Simulated
    }

    /// Release the underlying driver. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.driver.close().await?;
            self.closed = true;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            warn!(strategy = %self.strategy, "session dropped without close()");
        }
    }
}

/// Builds sessions according to the configured strategy.
pub struct Provisioner {
    config: HarnessConfig,
    store: Arc<MockStore>,
}

impl Provisioner {
    pub fn new(config: HarnessConfig) -> Self {
        let store = Arc::new(MockStore::new());
        // Non-default credentials must also work against the simulation.
        store.add_credential(&config.username, &config.password);
        Self { config, store }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Shared store behind every simulated session this provisioner
    /// hands out.
    pub fn store(&self) -> Arc<MockStore> {
        Arc::clone(&self.store)
    }

    /// Acquire a session.
    ///
    /// A failing local driver degrades to the simulation with a
    /// warning. A failing remote grid is an error unless fallback is
    /// explicitly permitted, since an unreachable grid that was asked
    /// for by name usually means a misconfigured run.
    pub async fn provision(&self) -> Result<Session> {
        let strategy = resolve_strategy(&self.config);
        match strategy {
            DriverStrategy::Simulated => Ok(self.simulated_session()),
            DriverStrategy::Local => {
                let endpoint = self
                    .config
                    .webdriver_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCAL_WEBDRIVER.to_string());
                match self.connect(&endpoint).await {
                    Ok(session) => Ok(session),
                    Err(e) => {
                        warn!(%endpoint, error = %e, "local driver unavailable, using simulation");
                        Ok(self.simulated_session())
                    }
                }
            }
            DriverStrategy::Remote => {
                // resolve_strategy only picks Remote when a grid URL is set.
                let endpoint = self.config.remote_url.clone().unwrap_or_default();
                match self.connect(&endpoint).await {
                    Ok(session) => Ok(session),
                    Err(e) if self.config.allow_fallback => {
                        warn!(%endpoint, error = %e, "remote grid unavailable, using simulation");
                        Ok(self.simulated_session())
                    }
                    Err(e) => Err(Error::DriverUnavailable(format!(
                        "remote grid {}: {}",
                        endpoint, e
                    ))),
                }
            }
        }
    }

    fn simulated_session(&self) -> Session {
        info!("provisioning simulated session");
        Session {
            strategy: DriverStrategy::Simulated,
            base_url: self.config.effective_base_url(),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            principal: None,
            last_extracted: None,
            driver: Box::new(SimulatedUi::new(self.store())),
            closed: false,
        }
    }

    async fn connect(&self, endpoint: &str) -> Result<Session> {
        let base_url = self.config.require_base_url()?.to_string();
        let strategy = resolve_strategy(&self.config);
        info!(%endpoint, %strategy, "connecting to WebDriver");

        let mut builder = ClientBuilder::native();
        builder.capabilities(browser_capabilities(self.config.headless));
        let client = tokio::time::timeout(self.config.driver_timeout, builder.connect(endpoint))
            .await
            .map_err(|_| Error::Timeout {
                what: format!("WebDriver connect to {}", endpoint),
                seconds: self.config.driver_timeout.as_secs(),
            })?
            .map_err(|e| Error::DriverUnavailable(e.to_string()))?;

        Ok(Session {
            strategy,
            base_url: base_url.clone(),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            principal: None,
            last_extracted: None,
            driver: Box::new(WebDriverUi::new(client, base_url)),
            closed: false,
        })
    }
}

/// Chrome capabilities matching how the suite runs in CI.
fn browser_capabilities(headless: bool) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec!["--no-sandbox", "--disable-gpu", "--window-size=1920,1080"];
    if headless {
        args.insert(0, "--headless=new");
    }
    json!({
        "browserName": "chrome",
        "goog:chromeOptions": { "args": args },
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HarnessConfig {
        HarnessConfig::default()
    }

    #[test]
    fn no_base_url_means_simulated() {
        assert_eq!(resolve_strategy(&config()), DriverStrategy::Simulated);
    }

    #[test]
    fn simulate_flag_wins_over_everything() {
        let cfg = HarnessConfig {
            base_url: Some("https://archive.example.org".to_string()),
            remote_url: Some("http://grid:4444".to_string()),
            simulate: true,
            ..config()
        };
        assert_eq!(resolve_strategy(&cfg), DriverStrategy::Simulated);
    }

    #[test]
    fn remote_url_selects_the_grid() {
        let cfg = HarnessConfig {
            base_url: Some("https://archive.example.org".to_string()),
            remote_url: Some("http://grid:4444".to_string()),
            ..config()
        };
        assert_eq!(resolve_strategy(&cfg), DriverStrategy::Remote);
    }

    #[test]
    fn base_url_alone_selects_local() {
        let cfg = HarnessConfig {
            base_url: Some("https://archive.example.org".to_string()),
            ..config()
        };
        assert_eq!(resolve_strategy(&cfg), DriverStrategy::Local);
    }

    #[test]
    fn headless_capabilities_include_the_headless_arg() {
        let caps = browser_capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].to_string();
        assert!(args.contains("--headless=new"));

        let caps = browser_capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].to_string();
        assert!(!args.contains("--headless"));
    }

    #[tokio::test]
    async fn simulated_provisioning_seeds_configured_credentials() {
        let cfg = HarnessConfig {
            username: "researcher".to_string(),
            password: "s3cret".to_string(),
            ..config()
        };
        let provisioner = Provisioner::new(cfg);
        let mut session = provisioner.provision().await.unwrap();
        assert!(session.is_simulated());
        assert!(provisioner.store().check_credentials("researcher", "s3cret"));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_local_driver_degrades_to_simulation() {
        let cfg = HarnessConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            webdriver_url: Some("http://127.0.0.1:1".to_string()),
            driver_timeout: Duration::from_millis(300),
            ..config()
        };
        let provisioner = Provisioner::new(cfg);
        let mut session = provisioner.provision().await.unwrap();
        assert_eq!(session.strategy, DriverStrategy::Simulated);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_remote_grid_is_environmental_without_fallback() {
        let cfg = HarnessConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            remote_url: Some("http://127.0.0.1:1".to_string()),
            driver_timeout: Duration::from_millis(300),
            ..config()
        };
        match Provisioner::new(cfg).provision().await {
            Err(err) => assert!(err.is_environmental()),
            Ok(_) => panic!("unreachable grid produced a session"),
        }
    }

    #[tokio::test]
    async fn unreachable_remote_grid_degrades_when_fallback_allowed() {
        let cfg = HarnessConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            remote_url: Some("http://127.0.0.1:1".to_string()),
            allow_fallback: true,
            driver_timeout: Duration::from_millis(300),
            ..config()
        };
        let mut session = Provisioner::new(cfg).provision().await.unwrap();
        assert_eq!(session.strategy, DriverStrategy::Simulated);
        session.close().await.unwrap();
    }
}
