use std::time::Duration;

use tracing::debug;

use neuroarc_common::{Project, Result};

use crate::selectors::projects;
use crate::session::Session;

use super::{check_form_error, wait_for_row, wait_for_visible};

const FORM_TIMEOUT: Duration = Duration::from_secs(10);

/// The project listing and its creation form.
pub struct ProjectsPage<'a> {
    session: &'a mut Session,
}

impl<'a> ProjectsPage<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    pub async fn open(&mut self) -> Result<()> {
        self.session.driver().goto(projects::PATH).await?;
        wait_for_visible(
            self.session.driver(),
            projects::CREATE_BUTTON,
            "projects",
            FORM_TIMEOUT,
        )
        .await
    }

    /// Create a project through the form. A form error after submission
    /// surfaces as `DuplicateName` or `Validation`.
    pub async fn create_project(&mut self, project: &Project) -> Result<()> {
        debug!(id = %project.id, "creating project via form");
        let driver = self.session.driver();
        driver.click(projects::CREATE_BUTTON).await?;
        wait_for_visible(driver, projects::ID_FIELD, "projects", FORM_TIMEOUT).await?;

        driver.fill(projects::ID_FIELD, &project.id).await?;
        driver.fill(projects::NAME_FIELD, &project.name).await?;
        if let Some(description) = &project.description {
            driver.fill(projects::DESCRIPTION_FIELD, description).await?;
        }
        driver.click(projects::SAVE).await?;

        check_form_error(driver, projects::FORM_ERROR, &project.id, "projects").await?;
        self.session.last_extracted = Some(project.id.clone());
        Ok(())
    }

    /// Whether a project row for `id` appears within the wait window.
    pub async fn project_exists(&mut self, id: &str) -> Result<bool> {
        wait_for_row(self.session.driver(), projects::ROWS, id, FORM_TIMEOUT).await
    }

    pub async fn rows(&mut self) -> Result<Vec<String>> {
        self.session.driver().texts_of(projects::ROWS).await
    }
}
