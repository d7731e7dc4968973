//! Job show screen and its definition modal.

use crate::dispatch::DefinitionText;
use crate::driver::ElementHandle;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::routes::{job_id_from_url, Route};
use crate::session::Session;
use async_trait::async_trait;
use tracing::debug;

/// Show screen controls
pub mod locators {
    use crate::locator::Locator;

    /// Job name in the page header
    pub const JOB_NAME_TEXT: Locator =
        Locator::css("job name header", ".jobInfoSection .jobNameLink");
    /// Link opening the job definition modal
    pub const JOB_DEFINITION: Locator =
        Locator::css("job definition link", "a[href=\"#job-definition-modal\"]");
    /// Node filter section of the definition modal
    pub const DEFINITION_NODEFILTERS: Locator = Locator::css(
        "definition node filters",
        "#job-definition-modal .job-definition-nodefilters",
    );
    /// Rendered node filter
    pub const NODE_FILTER_TEXT: Locator = Locator::css(
        "definition node filter",
        "#job-definition-modal .job-definition-nodefilters .node-filter-text",
    );
    /// Rendered thread count
    pub const THREADCOUNT_TEXT: Locator = Locator::css(
        "definition thread count",
        "#job-definition-modal .job-definition-nodefilters .node-threadcount",
    );
    /// Rendered keep-going policy
    pub const KEEPGOING_TEXT: Locator = Locator::css(
        "definition keep going",
        "#job-definition-modal .job-definition-nodefilters .node-keepgoing",
    );
    /// Rendered rank ordering
    pub const RANK_ORDER_TEXT: Locator = Locator::css(
        "definition rank order",
        "#job-definition-modal .job-definition-nodefilters .node-rank-order",
    );
    /// Rendered default selection policy
    pub const SELECTED_BY_DEFAULT_TEXT: Locator = Locator::css(
        "definition selected by default",
        "#job-definition-modal .job-definition-nodefilters .node-selected-by-default",
    );
    /// Rendered orchestrator label
    pub const ORCHESTRATOR_TEXT: Locator = Locator::css(
        "definition orchestrator",
        "#job-definition-modal .job-definition-orchestrator .orchestrator-name",
    );
    /// Close button of the definition modal
    pub const CLOSE_MODAL: Locator = Locator::css(
        "definition close button",
        "#job-definition-modal .modal-footer button[data-dismiss=\"modal\"]",
    );
}

/// Job show page.
///
/// After a save the application redirects here with an id the harness does
/// not know in advance, so the page may be bound without one; the id is
/// then recovered from the current URL on demand.
#[derive(Debug, Clone)]
pub struct JobShowPage<'a> {
    session: &'a Session,
    project: String,
    job_id: Option<String>,
}

impl<'a> JobShowPage<'a> {
    /// Show page reached by redirect
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            project: session.project().to_string(),
            job_id: None,
        }
    }

    /// Show page of a known job
    #[must_use]
    pub fn for_job(session: &'a Session, job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::new(session)
        }
    }

    /// Id of the shown job, from the binding or else the current URL
    ///
    /// # Errors
    ///
    /// Returns a driver error if the URL cannot be read.
    pub async fn job_id(&self) -> ProbeResult<Option<String>> {
        if let Some(id) = &self.job_id {
            return Ok(Some(id.clone()));
        }
        Ok(job_id_from_url(&self.session.current_url().await?))
    }

    /// Job name shown in the header, once it is displayed
    ///
    /// # Errors
    ///
    /// Returns a timeout if the header never shows.
    pub async fn job_name_text(&self) -> ProbeResult<String> {
        let header = self
            .wait_for(&locators::JOB_NAME_TEXT, self.load_options())
            .await?;
        Ok(self.session.driver().text(&header).await?.trim().to_string())
    }

    /// Definition link
    pub async fn job_definition(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::JOB_DEFINITION).await
    }

    /// Block until the definition link is displayed (the save redirect has
    /// landed)
    pub async fn wait_job_definition(&self) -> ProbeResult<ElementHandle> {
        self.wait_for(&locators::JOB_DEFINITION, self.load_options())
            .await
    }

    /// Block until the node filter section of the open modal is displayed
    pub async fn wait_definition_nodefilters(&self) -> ProbeResult<ElementHandle> {
        self.wait_for(
            &locators::DEFINITION_NODEFILTERS,
            self.session.config().timeouts.element(),
        )
        .await
    }

    /// Open the definition modal and wait for its node filter section
    ///
    /// # Errors
    ///
    /// Returns an error if the link is missing or the section never shows.
    pub async fn open_job_definition(&self) -> ProbeResult<()> {
        let link = self.wait_job_definition().await?;
        self.session.driver().click(&link).await?;
        let _ = self.wait_definition_nodefilters().await?;
        debug!(page = self.page_name(), "definition modal open");
        Ok(())
    }

    /// Rendered node filter sentence
    pub async fn job_definition_node_filter_matched_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::NODE_FILTER_TEXT).await
    }

    /// Rendered thread count sentence
    pub async fn job_definition_node_threadcount_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::THREADCOUNT_TEXT).await
    }

    /// Rendered keep-going sentence
    pub async fn job_definition_node_keepgoing_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::KEEPGOING_TEXT).await
    }

    /// Rendered rank ordering sentence
    pub async fn job_definition_node_rank_order_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::RANK_ORDER_TEXT).await
    }

    /// Rendered default-selection sentence
    pub async fn job_definition_node_selected_by_default_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::SELECTED_BY_DEFAULT_TEXT).await
    }

    /// Rendered orchestrator label
    pub async fn job_definition_orchestrator_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::ORCHESTRATOR_TEXT).await
    }

    /// All node dispatch sentences of the open modal
    ///
    /// # Errors
    ///
    /// Returns the first missing section.
    pub async fn read_definition(&self) -> ProbeResult<DefinitionText> {
        Ok(DefinitionText {
            node_filter: self.job_definition_node_filter_matched_text().await?,
            thread_count: self.job_definition_node_threadcount_text().await?,
            keep_going: self.job_definition_node_keepgoing_text().await?,
            rank_order: self.job_definition_node_rank_order_text().await?,
            selected_by_default: self.job_definition_node_selected_by_default_text().await?,
        })
    }

    /// Close the definition modal
    ///
    /// # Errors
    ///
    /// Returns an error if the close button is missing.
    pub async fn close_job_definition_modal(&self) -> ProbeResult<()> {
        self.click(&locators::CLOSE_MODAL).await
    }
}

#[async_trait]
impl PageObject for JobShowPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn route(&self) -> Route {
        Route::JobShow {
            project: self.project.clone(),
            id: self.job_id.clone().unwrap_or_default(),
        }
    }

    fn page_name(&self) -> &'static str {
        "job show"
    }

    fn url_pattern(&self) -> &'static str {
        "/project/*/job/show/*"
    }
}
