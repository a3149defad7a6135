//! NeuroArc E2E Test Framework
//!
//! A Rust-controlled harness that regression-tests the NeuroArc
//! archive's UI workflows (login, project/subject/experiment creation)
//! through browser automation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner                            │
//! │    ├── Provisioner -> Session (local | remote | simulated)  │
//! │    ├── Scenario::run(session) -> Outcome                    │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pages (login, dashboard, projects, subjects, experiments)  │
//! │    └── driver actions + extracted state / typed failures    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UiDriver                                                   │
//! │    ├── WebDriverUi  (fantoccini, real deployment)           │
//! │    └── SimulatedUi  (in-process mock backend)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! When no WebDriver endpoint or deployment is reachable the harness
//! falls back to the in-process simulation, so scripted workflows stay
//! executable in constrained environments.

pub mod driver;
pub mod pages;
pub mod runner;
pub mod scenario;
pub mod selectors;
pub mod session;
pub mod simulated;

pub use driver::UiDriver;
pub use runner::{ScenarioRunner, SuiteResult};
pub use scenario::{LifecycleState, Outcome, Scenario, ScenarioReport};
pub use session::{resolve_strategy, DriverStrategy, Provisioner, Session};

pub use neuroarc_common::{Error, HarnessConfig, Result};
