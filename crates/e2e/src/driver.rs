//! UI driver capability seam
//!
//! Page objects are polymorphic over [`UiDriver`], the handful of
//! interactions the workflows rely on. [`WebDriverUi`] drives a real
//! browser through a WebDriver endpoint; [`crate::simulated::SimulatedUi`]
//! drives the in-process mock backend through the same surface.

use async_trait::async_trait;
use fantoccini::{Client, Locator};
use tracing::debug;

use neuroarc_common::{Error, Result};

/// Minimal browser-interaction surface used by the page objects.
#[async_trait]
pub trait UiDriver: Send {
    /// Navigate to a path relative to the deployment base URL.
    async fn goto(&mut self, path: &str) -> Result<()>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Clear the element and type `value` into it.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Text of the first visible element matching `selector`.
    async fn text_of(&mut self, selector: &str) -> Result<String>;

    /// Texts of all elements matching `selector`, in document order.
    async fn texts_of(&mut self, selector: &str) -> Result<Vec<String>>;

    /// Whether an element matching `selector` is present and displayed.
    /// Absence is `Ok(false)`, never an error.
    async fn is_visible(&mut self, selector: &str) -> Result<bool>;

    /// Current location as a path relative to the base URL.
    async fn current_path(&mut self) -> Result<String>;

    /// Release the underlying session. Idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// [`UiDriver`] backed by a fantoccini WebDriver client.
pub struct WebDriverUi {
    client: Option<Client>,
    base_url: String,
    last_path: String,
}

impl WebDriverUi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            last_path: "/".to_string(),
        }
    }

    fn client(&mut self) -> Result<&mut Client> {
        self.client
            .as_mut()
            .ok_or_else(|| Error::WebDriver("session already closed".to_string()))
    }

    fn page_label(&self) -> String {
        self.last_path.clone()
    }
}

#[async_trait]
impl UiDriver for WebDriverUi {
    async fn goto(&mut self, path: &str) -> Result<()> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "navigating");
        self.client()?
            .goto(&url)
            .await
            .map_err(|e| Error::Navigation(format!("{}: {}", url, e)))?;
        self.last_path = path.to_string();
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let page = self.page_label();
        let element = self
            .client()?
            .find(Locator::Css(selector))
            .await
            .map_err(|_| Error::element_not_found(selector, &page))?;
        element
            .click()
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let page = self.page_label();
        let element = self
            .client()?
            .find(Locator::Css(selector))
            .await
            .map_err(|_| Error::element_not_found(selector, &page))?;
        element
            .clear()
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))?;
        element
            .send_keys(value)
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))
    }

    async fn text_of(&mut self, selector: &str) -> Result<String> {
        let page = self.page_label();
        let element = self
            .client()?
            .find(Locator::Css(selector))
            .await
            .map_err(|_| Error::element_not_found(selector, &page))?;
        let text = element
            .text()
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))?;
        Ok(text.trim().to_string())
    }

    async fn texts_of(&mut self, selector: &str) -> Result<Vec<String>> {
        let elements = self
            .client()?
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element
                .text()
                .await
                .map_err(|e| Error::WebDriver(e.to_string()))?;
            texts.push(text.trim().to_string());
        }
        Ok(texts)
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        let element = match self.client()?.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        element
            .is_displayed()
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))
    }

    async fn current_path(&mut self) -> Result<String> {
        let base = self.base_url.clone();
        let url = self
            .client()?
            .current_url()
            .await
            .map_err(|e| Error::WebDriver(e.to_string()))?;
        let url = url.to_string();
        let path = url
            .strip_prefix(&base)
            .map(str::to_string)
            .unwrap_or(url);
        Ok(if path.is_empty() { "/".to_string() } else { path })
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| Error::WebDriver(e.to_string()))?;
        }
        Ok(())
    }
}
