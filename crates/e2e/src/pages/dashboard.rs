use neuroarc_common::Result;

use crate::selectors::dashboard;
use crate::session::Session;

use super::wait_for_visible;

/// The landing page shown after login.
pub struct DashboardPage<'a> {
    session: &'a mut Session,
}

impl<'a> DashboardPage<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Wait for the navigation chrome that marks a loaded dashboard.
    pub async fn assert_loaded(&mut self) -> Result<()> {
        let timeout = neuroarc_common::config::DEFAULT_DRIVER_TIMEOUT;
        wait_for_visible(self.session.driver(), dashboard::NAV, "dashboard", timeout).await
    }

    pub async fn welcome_text(&mut self) -> Result<String> {
        self.session.driver().text_of(dashboard::WELCOME).await
    }

    pub async fn go_to_projects(&mut self) -> Result<()> {
        self.session.driver().click(dashboard::PROJECTS_LINK).await
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.session.driver().click(dashboard::LOGOUT).await?;
        self.session.principal = None;
        Ok(())
    }
}
