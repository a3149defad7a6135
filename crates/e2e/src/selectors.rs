//! Canonical CSS selectors and paths for the archive UI
//!
//! The page objects and the simulated UI both consume these constants,
//! so a selector drifting out of sync with the simulation is a compile
//! error rather than a silent mismatch. A `ElementNotFound` against a
//! real deployment signals a genuine layout change.

pub mod login {
    pub const PATH: &str = "/login";
    pub const USERNAME: &str = "input[name='login']";
    pub const PASSWORD: &str = "input[name='password']";
    pub const SUBMIT: &str = "form button[type='submit']";
    pub const ERROR_BANNER: &str = ".alert-error";
}

pub mod dashboard {
    pub const PATH: &str = "/";
    pub const NAV: &str = "#main-nav";
    pub const WELCOME: &str = "#welcome-banner";
    pub const PROJECTS_LINK: &str = "a[href='/projects']";
    pub const LOGOUT: &str = "#logout";
}

pub mod projects {
    pub const PATH: &str = "/projects";
    pub const CREATE_BUTTON: &str = "#create-project";
    pub const ID_FIELD: &str = "input[name='id']";
    pub const NAME_FIELD: &str = "input[name='name']";
    pub const DESCRIPTION_FIELD: &str = "textarea[name='description']";
    pub const SAVE: &str = "form button[type='submit']";
    pub const ROWS: &str = "table.project-list tbody tr";
    pub const FORM_ERROR: &str = ".form-error";
}

pub mod subjects {
    pub const ADD_BUTTON: &str = "#create-subject";
    pub const LABEL_FIELD: &str = "input[name='label']";
    pub const SPECIES_FIELD: &str = "input[name='species']";
    pub const SAVE: &str = "form button[type='submit']";
    pub const ROWS: &str = "table.subject-list tbody tr";
    pub const FORM_ERROR: &str = ".form-error";

    pub fn path(project: &str) -> String {
        format!("/projects/{}/subjects", project)
    }
}

pub mod experiments {
    pub const ADD_BUTTON: &str = "#create-experiment";
    pub const LABEL_FIELD: &str = "input[name='label']";
    pub const MODALITY_FIELD: &str = "input[name='modality']";
    pub const SAVE: &str = "form button[type='submit']";
    pub const ROWS: &str = "table.experiment-list tbody tr";
    pub const FORM_ERROR: &str = ".form-error";

    pub fn path(project: &str, subject: &str) -> String {
        format!("/projects/{}/subjects/{}/experiments", project, subject)
    }
}
