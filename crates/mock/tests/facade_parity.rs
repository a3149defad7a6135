//! The direct backend and the HTTP facade must be indistinguishable at
//! the `Backend` trait level. Each check here runs the same body
//! against both implementations.

use std::sync::Arc;

use neuroarc_common::{Error, Experiment, Project, ScopePath, Subject};
use neuroarc_mock::http::{HttpBackend, MockServer};
use neuroarc_mock::{Backend, MockBackend, MockStore};

async fn with_both_backends<F, Fut>(check: F)
where
    F: Fn(Box<dyn Backend>) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    check(Box::new(MockBackend::new(Arc::new(MockStore::new())))).await;

    let store = Arc::new(MockStore::new());
    let server = MockServer::spawn(store).await.expect("spawn facade");
    check(Box::new(HttpBackend::new(server.base_url()))).await;
    server.stop().await;
}

#[tokio::test]
async fn authentication_rules_match() {
    with_both_backends(|backend| async move {
        let err = backend.authenticate("admin", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed { .. }));

        let principal = backend.authenticate("admin", "admin").await.unwrap();
        assert_eq!(principal.username, "admin");

        // Repeated authentication is idempotent access.
        backend.authenticate("admin", "admin").await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn creates_require_authentication() {
    with_both_backends(|backend| async move {
        let err = backend
            .create_project(&Project::new("p1", "Project One"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
    })
    .await;
}

#[tokio::test]
async fn lifecycle_and_listing_order_match() {
    with_both_backends(|backend| async move {
        backend.authenticate("admin", "admin").await.unwrap();

        let project = backend
            .create_project(&Project::new("p1", "Project One").with_description("first"))
            .await
            .unwrap();
        let first = backend
            .create_subject(&project, &Subject::new("s1").with_species("Homo sapiens"))
            .await
            .unwrap();
        backend
            .create_subject(&project, &Subject::new("s2"))
            .await
            .unwrap();
        backend
            .create_experiment(&first, &Experiment::new("e1").with_modality("MR"))
            .await
            .unwrap();

        let subjects = backend.list_children(&project.scope()).await.unwrap();
        let names: Vec<&str> = subjects.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["s1", "s2"]);

        let experiments = backend.list_children(&first.scope()).await.unwrap();
        assert_eq!(experiments.len(), 1);
        assert_eq!(experiments[0].name, "e1");
        assert_eq!(experiments[0].extra, vec!["MR".to_string()]);
    })
    .await;
}

#[tokio::test]
async fn duplicate_and_not_found_surface_the_same_way() {
    with_both_backends(|backend| async move {
        backend.authenticate("admin", "admin").await.unwrap();

        let project = Project::new("p1", "Project One");
        let created = backend.create_project(&project).await.unwrap();
        let err = backend.create_project(&project).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));

        // Original entity unchanged and still resolvable.
        let projects = backend.list_children(&ScopePath::root()).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "p1");

        let stale = neuroarc_mock::ProjectRef {
            id: "ghost".to_string(),
        };
        let err = backend
            .create_subject(&stale, &Subject::new("s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        // Same name under a different parent is allowed.
        backend
            .create_subject(&created, &Subject::new("p1"))
            .await
            .unwrap();
    })
    .await;
}

#[tokio::test]
async fn listing_needs_no_authentication_on_either_transport() {
    with_both_backends(|backend| async move {
        let projects = backend.list_children(&ScopePath::root()).await.unwrap();
        assert!(projects.is_empty());
    })
    .await;
}

#[tokio::test]
async fn project_aliases_and_keywords_render_the_same_way() {
    with_both_backends(|backend| async move {
        backend.authenticate("admin", "admin").await.unwrap();
        backend
            .create_project(
                &Project::new("tagged", "Tagged Project")
                    .with_aliases(["TAG", "TP"])
                    .with_keywords(["neuro", "mri"]),
            )
            .await
            .unwrap();

        let projects = backend.list_children(&ScopePath::root()).await.unwrap();
        assert_eq!(
            projects[0].row_text(),
            "tagged | Tagged Project | Aka: TAG, TP | neuro, mri"
        );
    })
    .await;
}

#[tokio::test]
async fn empty_scope_lists_are_not_errors() {
    with_both_backends(|backend| async move {
        backend.authenticate("admin", "admin").await.unwrap();
        let project = backend
            .create_project(&Project::new("empty", "Empty Project"))
            .await
            .unwrap();
        let children = backend.list_children(&project.scope()).await.unwrap();
        assert!(children.is_empty());
    })
    .await;
}
