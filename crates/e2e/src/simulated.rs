//! In-process simulation of the archive UI
//!
//! [`SimulatedUi`] implements [`UiDriver`] over a [`MockBackend`]. It
//! does not render HTML; it models just enough screen state (current
//! screen, form visibility, field values, error banners) to behave
//! like the archive UI from the perspective of the page objects, with
//! every selector the pages use implemented explicitly. Entity state
//! lives in the shared [`MockStore`], so read-after-write listings go
//! through the same store the creates went to.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use neuroarc_common::{Error, Experiment, Project, Result, ScopePath, Subject};
use neuroarc_mock::{Backend, MockBackend, MockStore, ProjectRef, SubjectRef};

use crate::driver::UiDriver;
use crate::selectors;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Login,
    Dashboard,
    Projects,
    Subjects { project: String },
    Experiments { project: String, subject: String },
    /// Navigation target that does not exist (unknown project/subject).
    Missing,
}

#[derive(Debug, Default)]
struct UiState {
    path: String,
    banner: String,
    form_open: bool,
    fields: HashMap<&'static str, String>,
}

/// Simulated browser session over the mock backend.
pub struct SimulatedUi {
    backend: MockBackend,
    screen: Screen,
    state: UiState,
    closed: bool,
}

impl SimulatedUi {
    pub fn new(store: Arc<MockStore>) -> Self {
        Self {
            backend: MockBackend::new(store),
            screen: Screen::Login,
            state: UiState {
                path: selectors::login::PATH.to_string(),
                ..Default::default()
            },
            closed: false,
        }
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    fn authenticated(&self) -> bool {
        self.backend.current_principal().is_some()
    }

    fn show(&mut self, screen: Screen, path: String) {
        self.screen = screen;
        self.state = UiState {
            path,
            ..Default::default()
        };
    }

    /// Redirect to the login screen, as the archive does for
    /// unauthenticated access.
    fn redirect_to_login(&mut self) {
        debug!("redirecting unauthenticated navigation to login");
        self.show(Screen::Login, selectors::login::PATH.to_string());
    }

    fn field(&self, selector: &'static str) -> String {
        self.state.fields.get(selector).cloned().unwrap_or_default()
    }

    async fn submit_login(&mut self) {
        let username = self.field(selectors::login::USERNAME);
        let password = self.field(selectors::login::PASSWORD);
        match self.backend.authenticate(&username, &password).await {
            Ok(principal) => {
                debug!(username = %principal.username, "simulated login succeeded");
                self.show(Screen::Dashboard, selectors::dashboard::PATH.to_string());
            }
            Err(_) => {
                self.state.banner = INVALID_CREDENTIALS.to_string();
            }
        }
    }

    async fn submit_project(&mut self) {
        let mut project = Project::new(
            self.field(selectors::projects::ID_FIELD),
            self.field(selectors::projects::NAME_FIELD),
        );
        let description = self.field(selectors::projects::DESCRIPTION_FIELD);
        if !description.is_empty() {
            project.description = Some(description);
        }
        match self.backend.create_project(&project).await {
            Ok(_) => {
                self.state.form_open = false;
                self.state.fields.clear();
                self.state.banner.clear();
            }
            Err(e) => self.state.banner = e.to_string(),
        }
    }

    async fn submit_subject(&mut self, project: String) {
        let mut subject = Subject::new(self.field(selectors::subjects::LABEL_FIELD));
        let species = self.field(selectors::subjects::SPECIES_FIELD);
        if !species.is_empty() {
            subject.species = Some(species);
        }
        let project_ref = ProjectRef { id: project };
        match self.backend.create_subject(&project_ref, &subject).await {
            Ok(_) => {
                self.state.form_open = false;
                self.state.fields.clear();
                self.state.banner.clear();
            }
            Err(e) => self.state.banner = e.to_string(),
        }
    }

    async fn submit_experiment(&mut self, project: String, subject: String) {
        let mut experiment = Experiment::new(self.field(selectors::experiments::LABEL_FIELD));
        let modality = self.field(selectors::experiments::MODALITY_FIELD);
        if !modality.is_empty() {
            experiment.modality = Some(modality);
        }
        let subject_ref = SubjectRef {
            project,
            label: subject,
        };
        match self.backend.create_experiment(&subject_ref, &experiment).await {
            Ok(_) => {
                self.state.form_open = false;
                self.state.fields.clear();
                self.state.banner.clear();
            }
            Err(e) => self.state.banner = e.to_string(),
        }
    }

    fn open_form(&mut self) {
        self.state.form_open = true;
        self.state.fields.clear();
        self.state.banner.clear();
    }

    async fn rows_for(&self, scope: ScopePath) -> Result<Vec<String>> {
        let records = self.backend.list_children(&scope).await?;
        Ok(records.iter().map(|r| r.row_text()).collect())
    }

    /// Selector constants the current screen's form routes into.
    fn field_selector(&self, selector: &str) -> Option<&'static str> {
        use selectors::*;
        match &self.screen {
            Screen::Login => match selector {
                s if s == login::USERNAME => Some(login::USERNAME),
                s if s == login::PASSWORD => Some(login::PASSWORD),
                _ => None,
            },
            Screen::Projects if self.state.form_open => match selector {
                s if s == projects::ID_FIELD => Some(projects::ID_FIELD),
                s if s == projects::NAME_FIELD => Some(projects::NAME_FIELD),
                s if s == projects::DESCRIPTION_FIELD => Some(projects::DESCRIPTION_FIELD),
                _ => None,
            },
            Screen::Subjects { .. } if self.state.form_open => match selector {
                s if s == subjects::LABEL_FIELD => Some(subjects::LABEL_FIELD),
                s if s == subjects::SPECIES_FIELD => Some(subjects::SPECIES_FIELD),
                _ => None,
            },
            Screen::Experiments { .. } if self.state.form_open => match selector {
                s if s == experiments::LABEL_FIELD => Some(experiments::LABEL_FIELD),
                s if s == experiments::MODALITY_FIELD => Some(experiments::MODALITY_FIELD),
                _ => None,
            },
            _ => None,
        }
    }

    fn screen_name(&self) -> &'static str {
        match self.screen {
            Screen::Login => "login",
            Screen::Dashboard => "dashboard",
            Screen::Projects => "projects",
            Screen::Subjects { .. } => "subjects",
            Screen::Experiments { .. } => "experiments",
            Screen::Missing => "missing",
        }
    }

    fn not_found(&self, selector: &str) -> Error {
        Error::element_not_found(selector, self.screen_name())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::WebDriver("simulated session closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UiDriver for SimulatedUi {
    async fn goto(&mut self, path: &str) -> Result<()> {
        self.ensure_open()?;
        let path = if path.is_empty() { "/" } else { path };
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => {
                if self.authenticated() {
                    self.show(Screen::Dashboard, "/".to_string());
                } else {
                    self.redirect_to_login();
                }
            }
            ["login"] => self.redirect_to_login(),
            ["projects"] => {
                if !self.authenticated() {
                    self.redirect_to_login();
                } else {
                    self.show(Screen::Projects, selectors::projects::PATH.to_string());
                }
            }
            ["projects", project, "subjects"] => {
                if !self.authenticated() {
                    self.redirect_to_login();
                } else if !self
                    .backend
                    .store()
                    .scope_exists(&ScopePath::project(*project))
                {
                    self.show(Screen::Missing, path.to_string());
                } else {
                    self.show(
                        Screen::Subjects {
                            project: project.to_string(),
                        },
                        path.to_string(),
                    );
                }
            }
            ["projects", project, "subjects", subject, "experiments"] => {
                if !self.authenticated() {
                    self.redirect_to_login();
                } else if !self
                    .backend
                    .store()
                    .scope_exists(&ScopePath::subject(*project, *subject))
                {
                    self.show(Screen::Missing, path.to_string());
                } else {
                    self.show(
                        Screen::Experiments {
                            project: project.to_string(),
                            subject: subject.to_string(),
                        },
                        path.to_string(),
                    );
                }
            }
            _ => return Err(Error::Navigation(format!("unsupported path: {}", path))),
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.ensure_open()?;
        use selectors::*;
        match self.screen.clone() {
            Screen::Login if selector == login::SUBMIT => {
                self.submit_login().await;
                Ok(())
            }
            Screen::Dashboard if selector == dashboard::PROJECTS_LINK => {
                self.show(Screen::Projects, projects::PATH.to_string());
                Ok(())
            }
            Screen::Dashboard if selector == dashboard::LOGOUT => {
                self.backend.deauthenticate();
                self.redirect_to_login();
                Ok(())
            }
            Screen::Projects if selector == projects::CREATE_BUTTON => {
                self.open_form();
                Ok(())
            }
            Screen::Projects if selector == projects::SAVE && self.state.form_open => {
                self.submit_project().await;
                Ok(())
            }
            Screen::Subjects { .. } if selector == subjects::ADD_BUTTON => {
                self.open_form();
                Ok(())
            }
            Screen::Subjects { project } if selector == subjects::SAVE && self.state.form_open => {
                self.submit_subject(project).await;
                Ok(())
            }
            Screen::Experiments { .. } if selector == experiments::ADD_BUTTON => {
                self.open_form();
                Ok(())
            }
            Screen::Experiments { project, subject }
                if selector == experiments::SAVE && self.state.form_open =>
            {
                self.submit_experiment(project, subject).await;
                Ok(())
            }
            _ => Err(self.not_found(selector)),
        }
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.ensure_open()?;
        match self.field_selector(selector) {
            Some(key) => {
                self.state.fields.insert(key, value.to_string());
                Ok(())
            }
            None => Err(self.not_found(selector)),
        }
    }

    async fn text_of(&mut self, selector: &str) -> Result<String> {
        self.ensure_open()?;
        use selectors::*;
        let banner_selector = match self.screen {
            Screen::Login => Some(login::ERROR_BANNER),
            Screen::Projects => Some(projects::FORM_ERROR),
            Screen::Subjects { .. } => Some(subjects::FORM_ERROR),
            Screen::Experiments { .. } => Some(experiments::FORM_ERROR),
            _ => None,
        };
        if banner_selector == Some(selector) {
            if self.state.banner.is_empty() {
                return Err(self.not_found(selector));
            }
            return Ok(self.state.banner.clone());
        }
        if self.screen == Screen::Dashboard && selector == dashboard::WELCOME {
            let username = self
                .backend
                .current_principal()
                .map(|p| p.username)
                .unwrap_or_default();
            return Ok(format!("Welcome, {}", username));
        }
        // Fields echo their current value.
        if let Some(key) = self.field_selector(selector) {
            return Ok(self.field(key));
        }
        Err(self.not_found(selector))
    }

    async fn texts_of(&mut self, selector: &str) -> Result<Vec<String>> {
        self.ensure_open()?;
        use selectors::*;
        match self.screen.clone() {
            Screen::Projects if selector == projects::ROWS => {
                self.rows_for(ScopePath::root()).await
            }
            Screen::Subjects { project } if selector == subjects::ROWS => {
                self.rows_for(ScopePath::project(project)).await
            }
            Screen::Experiments { project, subject } if selector == experiments::ROWS => {
                self.rows_for(ScopePath::subject(project, subject)).await
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        self.ensure_open()?;
        use selectors::*;
        let visible = match &self.screen {
            Screen::Login => {
                selector == login::USERNAME
                    || selector == login::PASSWORD
                    || selector == login::SUBMIT
                    || (selector == login::ERROR_BANNER && !self.state.banner.is_empty())
            }
            Screen::Dashboard => {
                selector == dashboard::NAV
                    || selector == dashboard::WELCOME
                    || selector == dashboard::PROJECTS_LINK
                    || selector == dashboard::LOGOUT
            }
            Screen::Projects => {
                selector == projects::CREATE_BUTTON
                    || selector == projects::ROWS
                    || (selector == projects::FORM_ERROR && !self.state.banner.is_empty())
                    || (self.state.form_open && self.field_selector(selector).is_some())
                    || (self.state.form_open && selector == projects::SAVE)
            }
            Screen::Subjects { .. } => {
                selector == subjects::ADD_BUTTON
                    || selector == subjects::ROWS
                    || (selector == subjects::FORM_ERROR && !self.state.banner.is_empty())
                    || (self.state.form_open && self.field_selector(selector).is_some())
                    || (self.state.form_open && selector == subjects::SAVE)
            }
            Screen::Experiments { .. } => {
                selector == experiments::ADD_BUTTON
                    || selector == experiments::ROWS
                    || (selector == experiments::FORM_ERROR && !self.state.banner.is_empty())
                    || (self.state.form_open && self.field_selector(selector).is_some())
                    || (self.state.form_open && selector == experiments::SAVE)
            }
            Screen::Missing => false,
        };
        Ok(visible)
    }

    async fn current_path(&mut self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.state.path.clone())
    }

    async fn close(&mut self) -> Result<()> {
        // Leaves the shared store intact.
        self.closed = true;
        Ok(())
    }
}
