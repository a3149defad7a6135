use std::time::Duration;

use tracing::debug;

use neuroarc_common::{Result, Subject};

use crate::selectors::subjects;
use crate::session::Session;

use super::{check_form_error, wait_for_row, wait_for_visible};

const FORM_TIMEOUT: Duration = Duration::from_secs(10);

/// Subject listing for one project.
pub struct SubjectsPage<'a> {
    session: &'a mut Session,
    project: String,
}

impl<'a> SubjectsPage<'a> {
    pub fn new(session: &'a mut Session, project: impl Into<String>) -> Self {
        Self {
            session,
            project: project.into(),
        }
    }

    pub async fn open(&mut self) -> Result<()> {
        let path = subjects::path(&self.project);
        self.session.driver().goto(&path).await?;
        wait_for_visible(
            self.session.driver(),
            subjects::ADD_BUTTON,
            "subjects",
            FORM_TIMEOUT,
        )
        .await
    }

    pub async fn create_subject(&mut self, subject: &Subject) -> Result<()> {
        debug!(project = %self.project, label = %subject.label, "creating subject via form");
        let driver = self.session.driver();
        driver.click(subjects::ADD_BUTTON).await?;
        wait_for_visible(driver, subjects::LABEL_FIELD, "subjects", FORM_TIMEOUT).await?;

        driver.fill(subjects::LABEL_FIELD, &subject.label).await?;
        if let Some(species) = &subject.species {
            driver.fill(subjects::SPECIES_FIELD, species).await?;
        }
        driver.click(subjects::SAVE).await?;

        let scope = format!("project/{}", self.project);
        check_form_error(driver, subjects::FORM_ERROR, &subject.label, &scope).await?;
        self.session.last_extracted = Some(subject.label.clone());
        Ok(())
    }

    pub async fn subject_exists(&mut self, label: &str) -> Result<bool> {
        wait_for_row(self.session.driver(), subjects::ROWS, label, FORM_TIMEOUT).await
    }

    pub async fn rows(&mut self) -> Result<Vec<String>> {
        self.session.driver().texts_of(subjects::ROWS).await
    }
}
