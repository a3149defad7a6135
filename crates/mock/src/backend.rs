//! Backend operation surface
//!
//! [`Backend`] is the logical operation set the archive exposes for the
//! scripted workflows: authenticate, create project/subject/experiment,
//! and list children. [`MockBackend`] implements it with direct
//! in-process calls against a [`MockStore`]; [`crate::http::HttpBackend`]
//! implements the same trait over the HTTP facade.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use neuroarc_common::{
    EntityKind, EntityRecord, Error, Experiment, Project, Result, ScopePath, Subject,
};

use crate::store::MockStore;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Reference to a created project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: String,
}

impl ProjectRef {
    pub fn scope(&self) -> ScopePath {
        ScopePath::project(self.id.clone())
    }
}

/// Reference to a created subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRef {
    pub project: String,
    pub label: String,
}

impl SubjectRef {
    pub fn scope(&self) -> ScopePath {
        ScopePath::subject(self.project.clone(), self.label.clone())
    }
}

/// Reference to a registered experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentRef {
    pub project: String,
    pub subject: String,
    pub label: String,
}

/// The archive's entity-management operations.
///
/// All operations are synchronous in effect and return immediately; the
/// async signatures exist because the HTTP-facade implementation goes
/// over the wire. Create operations require a prior successful
/// `authenticate` on the same backend handle.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal>;

    async fn create_project(&self, project: &Project) -> Result<ProjectRef>;

    async fn create_subject(&self, project: &ProjectRef, subject: &Subject) -> Result<SubjectRef>;

    async fn create_experiment(
        &self,
        subject: &SubjectRef,
        experiment: &Experiment,
    ) -> Result<ExperimentRef>;

    /// Children of `scope` in insertion order; empty when the scope has
    /// no children.
    async fn list_children(&self, scope: &ScopePath) -> Result<Vec<EntityRecord>>;
}

/// Direct in-process implementation of [`Backend`].
///
/// Holds the per-session current principal; the store itself may be
/// shared process-wide across sessions.
pub struct MockBackend {
    store: Arc<MockStore>,
    current: Mutex<Option<Principal>>,
}

impl MockBackend {
    pub fn new(store: Arc<MockStore>) -> Self {
        Self {
            store,
            current: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<MockStore> {
        &self.store
    }

    /// The currently authenticated principal, if any.
    pub fn current_principal(&self) -> Option<Principal> {
        self.current.lock().clone()
    }

    /// Clear the current principal (logout).
    pub fn deauthenticate(&self) {
        *self.current.lock() = None;
    }

    fn require_principal(&self) -> Result<Principal> {
        self.current.lock().clone().ok_or(Error::Unauthenticated)
    }
}

pub(crate) fn project_record(project: &Project, created_by: &str) -> EntityRecord {
    let mut extra = vec![project.name.clone()];
    if let Some(description) = &project.description {
        extra.push(description.clone());
    }
    if !project.aliases.is_empty() {
        extra.push(format!("Aka: {}", project.aliases.join(", ")));
    }
    if !project.keywords.is_empty() {
        extra.push(project.keywords.join(", "));
    }
    EntityRecord {
        kind: EntityKind::Project,
        name: project.id.clone(),
        extra,
        created_at: chrono::Utc::now(),
        created_by: created_by.to_string(),
    }
}

pub(crate) fn subject_record(subject: &Subject, created_by: &str) -> EntityRecord {
    EntityRecord {
        kind: EntityKind::Subject,
        name: subject.label.clone(),
        extra: subject.species.iter().cloned().collect(),
        created_at: chrono::Utc::now(),
        created_by: created_by.to_string(),
    }
}

pub(crate) fn experiment_record(experiment: &Experiment, created_by: &str) -> EntityRecord {
    EntityRecord {
        kind: EntityKind::Experiment,
        name: experiment.label.clone(),
        extra: experiment.modality.iter().cloned().collect(),
        created_at: chrono::Utc::now(),
        created_by: created_by.to_string(),
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal> {
        if !self.store.check_credentials(username, password) {
            return Err(Error::AuthenticationFailed {
                username: username.to_string(),
            });
        }
        let principal = Principal {
            username: username.to_string(),
        };
        *self.current.lock() = Some(principal.clone());
        debug!(username, "authenticated against mock backend");
        Ok(principal)
    }

    async fn create_project(&self, project: &Project) -> Result<ProjectRef> {
        let principal = self.require_principal()?;
        if project.id.is_empty() || project.name.is_empty() {
            return Err(Error::Validation(
                "project id and name are required".to_string(),
            ));
        }
        self.store.insert(
            &ScopePath::root(),
            project_record(project, &principal.username),
        )?;
        Ok(ProjectRef {
            id: project.id.clone(),
        })
    }

    async fn create_subject(&self, project: &ProjectRef, subject: &Subject) -> Result<SubjectRef> {
        let principal = self.require_principal()?;
        if subject.label.is_empty() {
            return Err(Error::Validation("subject label is required".to_string()));
        }
        self.store.insert(
            &project.scope(),
            subject_record(subject, &principal.username),
        )?;
        Ok(SubjectRef {
            project: project.id.clone(),
            label: subject.label.clone(),
        })
    }

    async fn create_experiment(
        &self,
        subject: &SubjectRef,
        experiment: &Experiment,
    ) -> Result<ExperimentRef> {
        let principal = self.require_principal()?;
        if experiment.label.is_empty() {
            return Err(Error::Validation("experiment label is required".to_string()));
        }
        self.store.insert(
            &subject.scope(),
            experiment_record(experiment, &principal.username),
        )?;
        Ok(ExperimentRef {
            project: subject.project.clone(),
            subject: subject.label.clone(),
            label: experiment.label.clone(),
        })
    }

    async fn list_children(&self, scope: &ScopePath) -> Result<Vec<EntityRecord>> {
        self.store.list_children(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MockBackend {
        MockBackend::new(Arc::new(MockStore::new()))
    }

    #[tokio::test]
    async fn authenticate_is_idempotent_access() {
        let backend = backend();
        for _ in 0..3 {
            let principal = backend.authenticate("admin", "admin").await.unwrap();
            assert_eq!(principal.username, "admin");
        }
        assert_eq!(
            backend.current_principal().unwrap().username,
            "admin"
        );
    }

    #[tokio::test]
    async fn bad_credentials_rejected() {
        let backend = backend();
        let err = backend.authenticate("admin", "nope").await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed { .. }));
        assert!(backend.current_principal().is_none());
    }

    #[tokio::test]
    async fn create_requires_authentication() {
        let backend = backend();
        let err = backend
            .create_project(&Project::new("p1", "Project One"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    }

    #[tokio::test]
    async fn full_hierarchy_with_read_after_write() {
        let backend = backend();
        backend.authenticate("admin", "admin").await.unwrap();

        let project = backend
            .create_project(&Project::new("p1", "Project One").with_description("desc"))
            .await
            .unwrap();
        let subject = backend
            .create_subject(&project, &Subject::new("s1").with_species("Homo sapiens"))
            .await
            .unwrap();
        backend
            .create_experiment(&subject, &Experiment::new("e1").with_modality("MR"))
            .await
            .unwrap();

        let subjects = backend.list_children(&project.scope()).await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, "s1");
        assert_eq!(subjects[0].extra, vec!["Homo sapiens".to_string()]);
        assert_eq!(subjects[0].created_by, "admin");

        let experiments = backend.list_children(&subject.scope()).await.unwrap();
        assert_eq!(experiments.len(), 1);
        assert_eq!(experiments[0].name, "e1");
    }

    #[tokio::test]
    async fn project_rows_carry_aliases_and_keywords() {
        let backend = backend();
        backend.authenticate("admin", "admin").await.unwrap();
        backend
            .create_project(
                &Project::new("p1", "Project One")
                    .with_aliases(["P-ONE"])
                    .with_keywords(["test"]),
            )
            .await
            .unwrap();

        let projects = backend.list_children(&ScopePath::root()).await.unwrap();
        assert_eq!(projects[0].extra[1], "Aka: P-ONE");
        assert_eq!(projects[0].row_text(), "p1 | Project One | Aka: P-ONE | test");
    }

    #[tokio::test]
    async fn stale_project_ref_is_not_found() {
        let backend = backend();
        backend.authenticate("admin", "admin").await.unwrap();
        let stale = ProjectRef {
            id: "never-created".to_string(),
        };
        let err = backend
            .create_subject(&stale, &Subject::new("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_project_yields_duplicate_name() {
        let backend = backend();
        backend.authenticate("admin", "admin").await.unwrap();
        let project = Project::new("p1", "Project One");
        backend.create_project(&project).await.unwrap();
        let err = backend.create_project(&project).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn empty_fields_are_validation_errors() {
        let backend = backend();
        backend.authenticate("admin", "admin").await.unwrap();
        let err = backend
            .create_project(&Project::new("", "unnamed"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
