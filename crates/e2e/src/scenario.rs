//! Workflow scenarios
//!
//! Each [`Scenario`] scripts one UI workflow end to end through the
//! page objects. The lifecycle scenarios track their progress through
//! a [`LifecycleState`] machine whose transitions only move forward;
//! an out-of-order transition is a harness bug, not a UI regression.

use serde::{Deserialize, Serialize};
use tracing::info;

use neuroarc_common::{unique_name, Error, Experiment, Project, Result, Subject};

use crate::pages::{DashboardPage, ExperimentsPage, LoginPage, ProjectsPage, SubjectsPage};
use crate::session::Session;

/// Progress of a full create-and-verify workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    LoggedOut,
    LoggedIn,
    ProjectCreated,
    SubjectCreated,
    ExperimentCreated,
    Verified,
}

impl LifecycleState {
    fn successor(self) -> Option<LifecycleState> {
        use LifecycleState::*;
        match self {
            LoggedOut => Some(LoggedIn),
            LoggedIn => Some(ProjectCreated),
            ProjectCreated => Some(SubjectCreated),
            SubjectCreated => Some(ExperimentCreated),
            ExperimentCreated => Some(Verified),
            Verified => None,
        }
    }

    /// Move to `to`, which must be the immediate successor.
    pub fn advance(&mut self, to: LifecycleState) -> Result<()> {
        if self.successor() == Some(to) {
            *self = to;
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "illegal lifecycle transition {:?} -> {:?}",
                self, to
            )))
        }
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Outcome {
    Passed,
    Failed(String),
    /// Environment problem (no driver, no deployment), not a regression.
    Skipped(String),
}

/// One scenario's entry in the suite results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// The scripted workflows the suite runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Login, create project -> subject -> experiment, verify each
    /// through listings.
    ProjectLifecycle,
    /// Entities created with only required fields still list.
    OptionalFields,
    /// Wrong password is rejected with a visible banner.
    RejectsBadCredentials,
    /// A second project with an identical id is rejected and the
    /// original survives unchanged.
    RejectsDuplicateProject,
    /// Entity screens are unreachable without a login.
    RequiresAuthentication,
}

impl Scenario {
    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::ProjectLifecycle,
            Scenario::OptionalFields,
            Scenario::RejectsBadCredentials,
            Scenario::RejectsDuplicateProject,
            Scenario::RequiresAuthentication,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ProjectLifecycle => "project_lifecycle",
            Scenario::OptionalFields => "optional_fields",
            Scenario::RejectsBadCredentials => "rejects_bad_credentials",
            Scenario::RejectsDuplicateProject => "rejects_duplicate_project",
            Scenario::RequiresAuthentication => "requires_authentication",
        }
    }

    pub async fn run(&self, session: &mut Session) -> Result<()> {
        info!(scenario = self.name(), strategy = %session.strategy, "running scenario");
        match self {
            Scenario::ProjectLifecycle => project_lifecycle(session).await,
            Scenario::OptionalFields => optional_fields(session).await,
            Scenario::RejectsBadCredentials => rejects_bad_credentials(session).await,
            Scenario::RejectsDuplicateProject => rejects_duplicate_project(session).await,
            Scenario::RequiresAuthentication => requires_authentication(session).await,
        }
    }
}

async fn login(session: &mut Session) -> Result<()> {
    let (username, password) = (session.username.clone(), session.password.clone());
    let mut page = LoginPage::new(session);
    page.open().await?;
    page.login(&username, &password).await?;
    DashboardPage::new(session).assert_loaded().await
}

async fn project_lifecycle(session: &mut Session) -> Result<()> {
    let mut state = LifecycleState::LoggedOut;

    login(session).await?;
    state.advance(LifecycleState::LoggedIn)?;

    let mut dashboard = DashboardPage::new(session);
    if dashboard.welcome_text().await?.is_empty() {
        return Err(Error::Validation(
            "dashboard shows no welcome banner after login".to_string(),
        ));
    }
    dashboard.go_to_projects().await?;

    let project = Project::new(unique_name("AUTO"), "Automated Regression Project")
        .with_description("Created by the UI regression suite");
    let subject = Subject::new(unique_name("SUBJ")).with_species("Homo sapiens");
    let experiment = Experiment::new(unique_name("EXP")).with_modality("MR");

    let mut projects = ProjectsPage::new(session);
    projects.open().await?;
    projects.create_project(&project).await?;
    state.advance(LifecycleState::ProjectCreated)?;
    if !projects.project_exists(&project.id).await? {
        return Err(Error::Validation(format!(
            "project '{}' missing from listing after creation",
            project.id
        )));
    }

    let mut subjects = SubjectsPage::new(session, project.id.clone());
    subjects.open().await?;
    subjects.create_subject(&subject).await?;
    state.advance(LifecycleState::SubjectCreated)?;
    if !subjects.subject_exists(&subject.label).await? {
        return Err(Error::Validation(format!(
            "subject '{}' missing from listing after creation",
            subject.label
        )));
    }

    let mut experiments = ExperimentsPage::new(session, project.id.clone(), subject.label.clone());
    experiments.open().await?;
    experiments.create_experiment(&experiment).await?;
    state.advance(LifecycleState::ExperimentCreated)?;
    if !experiments.experiment_exists(&experiment.label).await? {
        return Err(Error::Validation(format!(
            "experiment '{}' missing from listing after creation",
            experiment.label
        )));
    }

    state.advance(LifecycleState::Verified)?;

    session.driver().goto("/").await?;
    DashboardPage::new(session).logout().await?;
    Ok(())
}

async fn optional_fields(session: &mut Session) -> Result<()> {
    login(session).await?;

    let project = Project::new(unique_name("MIN"), "Minimal Project");
    let subject = Subject::new(unique_name("SUBJ"));
    let experiment = Experiment::new(unique_name("EXP"));

    let mut projects = ProjectsPage::new(session);
    projects.open().await?;
    projects.create_project(&project).await?;

    let mut subjects = SubjectsPage::new(session, project.id.clone());
    subjects.open().await?;
    subjects.create_subject(&subject).await?;

    let mut experiments = ExperimentsPage::new(session, project.id.clone(), subject.label.clone());
    experiments.open().await?;
    experiments.create_experiment(&experiment).await?;

    if !experiments.experiment_exists(&experiment.label).await? {
        return Err(Error::Validation(
            "minimal experiment missing from listing".to_string(),
        ));
    }
    Ok(())
}

async fn rejects_bad_credentials(session: &mut Session) -> Result<()> {
    let username = session.username.clone();
    let mut page = LoginPage::new(session);
    page.open().await?;
    let banner = page
        .login_expecting_rejection(&username, "definitely-wrong-password")
        .await?;
    if banner.is_empty() {
        return Err(Error::Validation(
            "rejected login showed no error banner".to_string(),
        ));
    }
    Ok(())
}

async fn rejects_duplicate_project(session: &mut Session) -> Result<()> {
    login(session).await?;

    let project = Project::new(unique_name("DUP"), "Duplicate Check");
    let mut projects = ProjectsPage::new(session);
    projects.open().await?;
    projects.create_project(&project).await?;

    match projects.create_project(&project).await {
        Err(Error::DuplicateName { .. }) => {}
        Err(e) => return Err(e),
        Ok(()) => {
            return Err(Error::Validation(format!(
                "duplicate project '{}' was accepted",
                project.id
            )))
        }
    }

    // The original row must survive the rejected attempt.
    let matching = projects
        .rows()
        .await?
        .into_iter()
        .filter(|row| row.contains(&project.id))
        .count();
    if matching != 1 {
        return Err(Error::Validation(format!(
            "expected exactly one row for '{}', found {}",
            project.id, matching
        )));
    }
    Ok(())
}

async fn requires_authentication(session: &mut Session) -> Result<()> {
    let driver = session.driver();
    driver.goto("/projects").await?;
    let path = driver.current_path().await?;
    if path != crate::selectors::login::PATH {
        return Err(Error::Validation(format!(
            "unauthenticated visit to /projects landed on '{}' instead of the login page",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_advances_forward_only() {
        let mut state = LifecycleState::LoggedOut;
        state.advance(LifecycleState::LoggedIn).unwrap();
        state.advance(LifecycleState::ProjectCreated).unwrap();

        // Skipping ahead and moving backward are both rejected.
        assert!(state.advance(LifecycleState::Verified).is_err());
        assert!(state.advance(LifecycleState::LoggedIn).is_err());
        assert_eq!(state, LifecycleState::ProjectCreated);

        state.advance(LifecycleState::SubjectCreated).unwrap();
        state.advance(LifecycleState::ExperimentCreated).unwrap();
        state.advance(LifecycleState::Verified).unwrap();
        assert!(state.advance(LifecycleState::Verified).is_err());
    }

    #[test]
    fn scenario_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            Scenario::all().iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Scenario::all().len());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Failed("row missing".to_string())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "row missing");

        let json = serde_json::to_value(Outcome::Passed).unwrap();
        assert_eq!(json["status"], "passed");
    }
}
