//! Minimal HTTP facade over the mock store
//!
//! Exposes the same logical operation set as [`crate::MockBackend`] so
//! callers reaching the simulation over HTTP cannot tell it apart from
//! direct in-process calls. [`MockServer`] serves the facade on an
//! ephemeral port; [`HttpBackend`] is the matching client-side
//! implementation of the [`Backend`] trait.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use neuroarc_common::{
    EntityRecord, Error, Experiment, Project, Result, ScopePath, Subject,
};

use crate::backend::{
    experiment_record, project_record, subject_record, Backend, ExperimentRef, Principal,
    ProjectRef, SubjectRef,
};
use crate::store::MockStore;

const SESSION_HEADER: &str = "x-neuroarc-session";

// ============================================================================
// Server side
// ============================================================================

#[derive(Clone)]
struct FacadeState {
    store: Arc<MockStore>,
    /// Session token -> username.
    sessions: Arc<Mutex<HashMap<String, String>>>,
}

/// Handle to a running facade server. Shuts down when dropped.
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Serve the facade for `store` on an ephemeral local port.
    pub async fn spawn(store: Arc<MockStore>) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = FacadeState {
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        };
        let app = router(state);

        let (shutdown, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = serve.await {
                debug!("mock facade exited: {}", e);
            }
        });

        info!("mock HTTP facade listening on {}", addr);
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            task,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server and wait for it to wind down.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}

fn router(state: FacadeState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/data/auth", post(auth))
        .route("/data/projects", get(list_projects))
        .route("/data/projects/:project", put(create_project))
        .route("/data/projects/:project/subjects", get(list_subjects))
        .route("/data/projects/:project/subjects/:subject", put(create_subject))
        .route(
            "/data/projects/:project/subjects/:subject/experiments",
            get(list_experiments),
        )
        .route(
            "/data/projects/:project/subjects/:subject/experiments/:experiment",
            put(create_experiment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire form of a harness error, carrying enough to reconstruct the
/// typed variant on the client side.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = ErrorBody {
            message: self.0.to_string(),
            scope: None,
            name: None,
            username: None,
        };
        let status = match &self.0 {
            Error::AuthenticationFailed { username } => {
                body.username = Some(username.clone());
                StatusCode::UNAUTHORIZED
            }
            Error::Unauthenticated => StatusCode::FORBIDDEN,
            Error::NotFound { scope } => {
                body.scope = Some(scope.clone());
                StatusCode::NOT_FOUND
            }
            Error::DuplicateName { scope, name } => {
                body.scope = Some(scope.clone());
                body.name = Some(name.clone());
                StatusCode::CONFLICT
            }
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(body)).into_response()
    }
}

fn require_session(state: &FacadeState, headers: &HeaderMap) -> std::result::Result<String, ApiError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|token| state.sessions.lock().get(token).cloned())
        .ok_or(ApiError(Error::Unauthenticated))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuthResponse {
    token: String,
    username: String,
}

async fn auth(
    State(state): State<FacadeState>,
    Json(req): Json<AuthRequest>,
) -> std::result::Result<Json<AuthResponse>, ApiError> {
    if !state.store.check_credentials(&req.username, &req.password) {
        return Err(ApiError(Error::AuthenticationFailed {
            username: req.username,
        }));
    }
    let token = Uuid::new_v4().to_string();
    state
        .sessions
        .lock()
        .insert(token.clone(), req.username.clone());
    Ok(Json(AuthResponse {
        token,
        username: req.username,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateProjectRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

async fn create_project(
    State(state): State<FacadeState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CreateProjectRequest>,
) -> std::result::Result<StatusCode, ApiError> {
    let username = require_session(&state, &headers)?;
    if project.is_empty() || req.name.is_empty() {
        return Err(ApiError(Error::Validation(
            "project id and name are required".to_string(),
        )));
    }
    let mut entity = Project::new(project, req.name);
    entity.description = req.description;
    entity.aliases = req.aliases;
    entity.keywords = req.keywords;
    state
        .store
        .insert(&ScopePath::root(), project_record(&entity, &username))?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateSubjectRequest {
    #[serde(default)]
    species: Option<String>,
}

async fn create_subject(
    State(state): State<FacadeState>,
    Path((project, subject)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<CreateSubjectRequest>,
) -> std::result::Result<StatusCode, ApiError> {
    let username = require_session(&state, &headers)?;
    let mut entity = Subject::new(subject);
    entity.species = req.species;
    state
        .store
        .insert(&ScopePath::project(project), subject_record(&entity, &username))?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateExperimentRequest {
    #[serde(default)]
    modality: Option<String>,
}

async fn create_experiment(
    State(state): State<FacadeState>,
    Path((project, subject, experiment)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(req): Json<CreateExperimentRequest>,
) -> std::result::Result<StatusCode, ApiError> {
    let username = require_session(&state, &headers)?;
    let mut entity = Experiment::new(experiment);
    entity.modality = req.modality;
    state.store.insert(
        &ScopePath::subject(project, subject),
        experiment_record(&entity, &username),
    )?;
    Ok(StatusCode::CREATED)
}

// Listings are read-only and require no session, matching the direct
// backend.

async fn list_projects(
    State(state): State<FacadeState>,
) -> std::result::Result<Json<Vec<EntityRecord>>, ApiError> {
    Ok(Json(state.store.list_children(&ScopePath::root())?))
}

async fn list_subjects(
    State(state): State<FacadeState>,
    Path(project): Path<String>,
) -> std::result::Result<Json<Vec<EntityRecord>>, ApiError> {
    Ok(Json(state.store.list_children(&ScopePath::project(project))?))
}

async fn list_experiments(
    State(state): State<FacadeState>,
    Path((project, subject)): Path<(String, String)>,
) -> std::result::Result<Json<Vec<EntityRecord>>, ApiError> {
    Ok(Json(
        state
            .store
            .list_children(&ScopePath::subject(project, subject))?,
    ))
}

// ============================================================================
// Client side
// ============================================================================

/// [`Backend`] implementation that talks to the facade over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn session_token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    async fn decode_error(response: reqwest::Response) -> Error {
        // reqwest and axum are on different http major versions, so
        // compare the raw status number.
        let status = response.status().as_u16();
        let body: ErrorBody = match response.json().await {
            Ok(body) => body,
            Err(e) => return Error::Internal(format!("unreadable error response: {}", e)),
        };
        match status {
            401 => Error::AuthenticationFailed {
                username: body.username.unwrap_or_default(),
            },
            403 => Error::Unauthenticated,
            404 => Error::NotFound {
                scope: body.scope.unwrap_or_default(),
            },
            409 => Error::DuplicateName {
                scope: body.scope.unwrap_or_default(),
                name: body.name.unwrap_or_default(),
            },
            422 => Error::Validation(body.message),
            _ => Error::Internal(body.message),
        }
    }

    async fn put_entity<T: Serialize>(&self, path: &str, payload: &T) -> Result<()> {
        let token = self.session_token().ok_or(Error::Unauthenticated)?;
        let response = self
            .client
            .put(self.url(path))
            .header(SESSION_HEADER, token)
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(())
    }

    fn children_path(scope: &ScopePath) -> String {
        match scope {
            ScopePath::Root => "/data/projects".to_string(),
            ScopePath::Project { project } => format!("/data/projects/{}/subjects", project),
            ScopePath::Subject { project, subject } => {
                format!("/data/projects/{}/subjects/{}/experiments", project, subject)
            }
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal> {
        let response = self
            .client
            .post(self.url("/data/auth"))
            .json(&AuthRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        let auth: AuthResponse = response.json().await?;
        *self.token.lock() = Some(auth.token);
        Ok(Principal {
            username: auth.username,
        })
    }

    async fn create_project(&self, project: &Project) -> Result<ProjectRef> {
        self.put_entity(
            &format!("/data/projects/{}", project.id),
            &CreateProjectRequest {
                name: project.name.clone(),
                description: project.description.clone(),
                aliases: project.aliases.clone(),
                keywords: project.keywords.clone(),
            },
        )
        .await?;
        Ok(ProjectRef {
            id: project.id.clone(),
        })
    }

    async fn create_subject(&self, project: &ProjectRef, subject: &Subject) -> Result<SubjectRef> {
        self.put_entity(
            &format!("/data/projects/{}/subjects/{}", project.id, subject.label),
            &CreateSubjectRequest {
                species: subject.species.clone(),
            },
        )
        .await?;
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
        self.put_entity(
            &format!(
                "/data/projects/{}/subjects/{}/experiments/{}",
                subject.project, subject.label, experiment.label
            ),
            &CreateExperimentRequest {
                modality: experiment.modality.clone(),
            },
        )
        .await?;
        Ok(ExperimentRef {
            project: subject.project.clone(),
            subject: subject.label.clone(),
            label: experiment.label.clone(),
        })
    }

    async fn list_children(&self, scope: &ScopePath) -> Result<Vec<EntityRecord>> {
        let response = self
            .client
            .get(self.url(&Self::children_path(scope)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response.json().await?)
    }
}
