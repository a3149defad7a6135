//! NeuroArc Mock Backend
//!
//! A deterministic, stateful stand-in for a real archive deployment's
//! authentication and entity-management surface. The store is an
//! explicitly constructed object (no ambient singletons) so isolated
//! test processes never cross-contaminate; the same logical operations
//! are reachable either through direct in-process calls
//! ([`MockBackend`]) or through a minimal HTTP facade
//! ([`http::MockServer`] + [`http::HttpBackend`]), and callers cannot
//! tell which they got.

pub mod backend;
pub mod http;
pub mod store;

pub use backend::{Backend, ExperimentRef, MockBackend, Principal, ProjectRef, SubjectRef};
pub use store::MockStore;
