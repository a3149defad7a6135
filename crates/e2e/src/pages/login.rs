use tracing::debug;

use neuroarc_common::{Error, Result};

use crate::selectors::login;
use crate::session::Session;

use super::wait_for_visible;

/// The sign-in screen.
pub struct LoginPage<'a> {
    session: &'a mut Session,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    pub async fn open(&mut self) -> Result<()> {
        let timeout = neuroarc_common::config::DEFAULT_DRIVER_TIMEOUT;
        self.session.driver().goto(login::PATH).await?;
        wait_for_visible(self.session.driver(), login::USERNAME, "login", timeout).await
    }

    /// Submit credentials and verify the dashboard loads.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        debug!(%username, "submitting login form");
        let driver = self.session.driver();
        driver.fill(login::USERNAME, username).await?;
        driver.fill(login::PASSWORD, password).await?;
        driver.click(login::SUBMIT).await?;

        if driver.current_path().await? == login::PATH {
            return Err(Error::AuthenticationFailed {
                username: username.to_string(),
            });
        }
        self.session.principal = Some(username.to_string());
        Ok(())
    }

    pub async fn is_displayed(&mut self) -> Result<bool> {
        self.session.driver().is_visible(login::USERNAME).await
    }

    /// Submit credentials expecting rejection; returns the banner text.
    pub async fn login_expecting_rejection(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<String> {
        let driver = self.session.driver();
        driver.fill(login::USERNAME, username).await?;
        driver.fill(login::PASSWORD, password).await?;
        driver.click(login::SUBMIT).await?;

        if driver.current_path().await? != login::PATH {
            return Err(Error::Validation(format!(
                "credentials for '{}' were accepted",
                username
            )));
        }
        driver.text_of(login::ERROR_BANNER).await
    }
}
