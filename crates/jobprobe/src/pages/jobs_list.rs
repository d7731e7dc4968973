//! Job list of a project.

use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::routes::Route;
use crate::session::Session;
use async_trait::async_trait;

/// Job list page
#[derive(Debug, Clone)]
pub struct JobsListPage<'a> {
    session: &'a Session,
    project: String,
}

impl<'a> JobsListPage<'a> {
    /// Job list of the session's project
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            project: session.project().to_string(),
        }
    }

    /// Whether a job link with exactly `name` is listed
    ///
    /// # Errors
    ///
    /// Returns a driver error if the lookup fails.
    pub async fn has_job(&self, name: &str) -> ProbeResult<bool> {
        let locator = Locator::new(
            format!("job link {name}"),
            Selector::link_text(name.to_string()),
        );
        Ok(self
            .session
            .driver()
            .find_element(locator.selector())
            .await?
            .is_some())
    }
}

#[async_trait]
impl PageObject for JobsListPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn route(&self) -> Route {
        Route::JobsList {
            project: self.project.clone(),
        }
    }

    fn page_name(&self) -> &'static str {
        "jobs list"
    }

    fn url_pattern(&self) -> &'static str {
        "/project/*/jobs"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_lands_on_list() {
        let driver = Arc::new(MockDriver::new());
        let session = Session::new(Arc::clone(&driver), HarnessConfig::default());
        let page = JobsListPage::new(&session);
        page.get().await.unwrap();
        assert!(page.is_current().await.unwrap());
    }

    #[tokio::test]
    async fn test_has_job_matches_link_text() {
        let driver = Arc::new(MockDriver::new());
        driver.add_element(
            &Selector::link_text("renamed job with node orchestrator"),
            MockElement::with_text("renamed job with node orchestrator"),
        );
        let session = Session::new(Arc::clone(&driver), HarnessConfig::default());
        let page = JobsListPage::new(&session);
        assert!(page.has_job("renamed job with node orchestrator").await.unwrap());
        assert!(!page.has_job("job with node orchestrator").await.unwrap());
    }
}
