//! Page objects for the archive UI
//!
//! Each page wraps a [`Session`] and exposes the workflow-level
//! operations the scenarios script against. Pages never reach into
//! backend state; everything goes through the driver, so the same
//! scenario code runs against a real deployment and the simulation.

use std::time::{Duration, Instant};

use neuroarc_common::{Error, Result};

use crate::driver::UiDriver;

mod dashboard;
mod experiments;
mod login;
mod projects;
mod subjects;

pub use dashboard::DashboardPage;
pub use experiments::ExperimentsPage;
pub use login::LoginPage;
pub use projects::ProjectsPage;
pub use subjects::SubjectsPage;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll until `selector` is visible, up to `timeout`.
pub(crate) async fn wait_for_visible(
    driver: &mut dyn UiDriver,
    selector: &str,
    page: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if driver.is_visible(selector).await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::element_not_found(selector, page));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll until a listing row containing `needle` appears, up to
/// `timeout`. Creation is asynchronous on real deployments; reads
/// confirm writes only after the row shows up.
pub(crate) async fn wait_for_row(
    driver: &mut dyn UiDriver,
    rows_selector: &str,
    needle: &str,
    timeout: Duration,
) -> Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        let rows = driver.texts_of(rows_selector).await?;
        if rows.iter().any(|row| row.contains(needle)) {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Read the form error banner, if shown, and turn it into the typed
/// error the backend would have produced.
pub(crate) async fn check_form_error(
    driver: &mut dyn UiDriver,
    banner_selector: &str,
    name: &str,
    scope: &str,
) -> Result<()> {
    if !driver.is_visible(banner_selector).await? {
        return Ok(());
    }
    let banner = driver.text_of(banner_selector).await?;
    if banner.contains("already exists") {
        Err(Error::duplicate(scope, name))
    } else {
        Err(Error::Validation(banner))
    }
}
