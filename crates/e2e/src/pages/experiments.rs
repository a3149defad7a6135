use std::time::Duration;

use tracing::debug;

use neuroarc_common::{Experiment, Result};

use crate::selectors::experiments;
use crate::session::Session;

use super::{check_form_error, wait_for_row, wait_for_visible};

const FORM_TIMEOUT: Duration = Duration::from_secs(10);

/// Experiment listing for one subject.
pub struct ExperimentsPage<'a> {
    session: &'a mut Session,
    project: String,
    subject: String,
}

impl<'a> ExperimentsPage<'a> {
    pub fn new(
        session: &'a mut Session,
        project: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            session,
            project: project.into(),
            subject: subject.into(),
        }
    }

    pub async fn open(&mut self) -> Result<()> {
        let path = experiments::path(&self.project, &self.subject);
        self.session.driver().goto(&path).await?;
        wait_for_visible(
            self.session.driver(),
            experiments::ADD_BUTTON,
            "experiments",
            FORM_TIMEOUT,
        )
        .await
    }

    pub async fn create_experiment(&mut self, experiment: &Experiment) -> Result<()> {
        debug!(
            project = %self.project,
            subject = %self.subject,
            label = %experiment.label,
            "creating experiment via form"
        );
        let driver = self.session.driver();
        driver.click(experiments::ADD_BUTTON).await?;
        wait_for_visible(driver, experiments::LABEL_FIELD, "experiments", FORM_TIMEOUT).await?;

        driver.fill(experiments::LABEL_FIELD, &experiment.label).await?;
        if let Some(modality) = &experiment.modality {
            driver.fill(experiments::MODALITY_FIELD, modality).await?;
        }
        driver.click(experiments::SAVE).await?;

        let scope = format!("project/{}/subject/{}", self.project, self.subject);
        check_form_error(driver, experiments::FORM_ERROR, &experiment.label, &scope).await?;
        self.session.last_extracted = Some(experiment.label.clone());
        Ok(())
    }

    pub async fn experiment_exists(&mut self, label: &str) -> Result<bool> {
        wait_for_row(self.session.driver(), experiments::ROWS, label, FORM_TIMEOUT).await
    }

    pub async fn rows(&mut self) -> Result<Vec<String>> {
        self.session.driver().texts_of(experiments::ROWS).await
    }
}
