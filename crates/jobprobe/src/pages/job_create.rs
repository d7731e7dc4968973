//! Job create/edit form.
//!
//! The same form serves both screens; a page bound to a job id addresses
//! the edit route, one without addresses the create route.

use crate::dispatch::{matched_nodes_text, DispatchConfig, DispatchReadback, OrchestratorKind};
use crate::driver::ElementHandle;
use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::routes::Route;
use crate::session::Session;
use crate::wait::{wait_until, Condition};
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, info};

/// Command entered as the single workflow step of a basic job
pub const BASIC_JOB_COMMAND: &str = "echo selenium test";

/// Job form controls
pub mod locators {
    use crate::locator::Locator;

    /// Job name input
    pub const JOB_NAME: Locator = Locator::css("job name input", "form input[name=\"jobName\"]");
    /// Workflow tab
    pub const TAB_WORKFLOW: Locator =
        Locator::css("workflow tab", "#job_edit_tabs > li > a[href='#tab_workflow']");
    /// Nodes tab
    pub const TAB_NODES: Locator =
        Locator::css("nodes tab", "#job_edit_tabs > li > a[href='#tab_nodes']");
    /// "Command" entry of the add-step list
    pub const ADD_WF_STEP_COMMAND: Locator = Locator::css(
        "add command step",
        "#wfnewtypes #addnodestep .add_node_step_type[data-node-step-type=command]",
    );
    /// Remote command input of the open step editor
    pub const WF_STEP_COMMAND_REMOTE_TEXT: Locator =
        Locator::id("step command input", "adhocRemoteStringField");
    /// Edit form of step 0, removed from the document when the step is saved
    pub const WF_STEP0_EDIT_FORM: Locator =
        Locator::css("step 0 edit form", "#wfli_0 div.wfitemEditForm");
    /// Save button of step 0
    pub const WF_STEP0_SAVE: Locator = Locator::css(
        "step 0 save button",
        "#wfli_0 div.wfitemEditForm div._wfiedit > div.floatr > span.btn.btn-cta.btn-sm",
    );
    /// Rendered (read-only) view of step 0
    pub const WF_STEP0_VIEW: Locator = Locator::id("step 0 view", "wfivis_0");

    /// "Dispatch to nodes" radio
    pub const DISPATCH_NODES_TRUE: Locator = Locator::id("dispatch to nodes", "doNodedispatchTrue");
    /// "Execute locally" radio
    pub const DISPATCH_NODES_FALSE: Locator = Locator::id("execute locally", "doNodedispatchFalse");
    /// Node filter input
    pub const NODE_FILTER: Locator = Locator::id("node filter input", "schedJobNodeFilter");
    /// Node filter menu toggle
    pub const NODE_FILTER_MENU: Locator = Locator::css(
        "node filter menu",
        "#job_edit__node_filter_include .dropdown-toggle",
    );
    /// "All nodes" entry of the filter menu
    pub const NODE_FILTER_SELECT_ALL: Locator = Locator::css(
        "select all nodes",
        "#job_edit__node_filter_include .dropdown-menu a.nodefilterlink[data-node-filter='.*']",
    );
    /// Matched node summary
    pub const MATCHED_NODES: Locator = Locator::css("matched nodes", "#nodegroupitem span.text-info");
    /// Show excluded nodes: yes
    pub const SHOW_EXCLUDED_YES: Locator = Locator::id("show excluded: yes", "excludeFilterTrue");
    /// Show excluded nodes: no
    pub const SHOW_EXCLUDED_NO: Locator = Locator::id("show excluded: no", "excludeFilterFalse");
    /// Editable filter: yes
    pub const EDITABLE_FILTER_YES: Locator = Locator::id("editable filter: yes", "editableFilterTrue");
    /// Editable filter: no
    pub const EDITABLE_FILTER_NO: Locator = Locator::id("editable filter: no", "editableFilterFalse");
    /// Thread count input
    pub const THREADCOUNT: Locator = Locator::id("thread count input", "schedJobnodeThreadcount");
    /// Rank attribute input
    pub const RANK_ATTRIBUTE: Locator =
        Locator::id("rank attribute input", "schedJobnodeRankAttribute");
    /// Rank order: ascending
    pub const RANK_ORDER_ASCENDING: Locator =
        Locator::id("rank order: ascending", "nodeRankOrderAscending");
    /// Rank order: descending
    pub const RANK_ORDER_DESCENDING: Locator =
        Locator::id("rank order: descending", "nodeRankOrderDescending");
    /// Keep going: true
    pub const KEEPGOING_TRUE: Locator = Locator::id("keep going: true", "nodeKeepgoingTrue");
    /// Keep going: false
    pub const KEEPGOING_FALSE: Locator = Locator::id("keep going: false", "nodeKeepgoingFalse");
    /// Success on empty node filter: true
    pub const SUCCESS_ON_EMPTY_TRUE: Locator =
        Locator::id("success on empty filter: true", "successOnEmptyNodeFilterTrue");
    /// Success on empty node filter: false
    pub const SUCCESS_ON_EMPTY_FALSE: Locator =
        Locator::id("success on empty filter: false", "successOnEmptyNodeFilterFalse");
    /// Nodes selected by default: true
    pub const SELECTED_BY_DEFAULT_TRUE: Locator =
        Locator::id("selected by default: true", "nodesSelectedByDefaultTrue");
    /// Nodes selected by default: false
    pub const SELECTED_BY_DEFAULT_FALSE: Locator =
        Locator::id("selected by default: false", "nodesSelectedByDefaultFalse");
    /// Orchestrator dropdown toggle
    pub const ORCHESTRATOR_DROPDOWN: Locator =
        Locator::css("orchestrator dropdown", "#orchestrator-edit-type-dropdown > button");

    /// Save on the create screen
    pub const SAVE: Locator = Locator::id("create button", "Create");
    /// Save on the edit screen
    pub const EDIT_SAVE: Locator = Locator::id("update button", "jobUpdateSaveButton");
}

/// Progress of [`JobCreatePage::create_basic_job`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicJobState {
    /// Create form loaded, name entered
    FormLoaded,
    /// Workflow tab active
    WorkflowTabSelected,
    /// Command step editor open
    StepEditorOpen,
    /// Command typed
    StepContentEntered,
    /// Step save clicked and rendered view visible
    StepSaved,
    /// Step edit form gone from the document
    StepEditorClosed,
}

impl fmt::Display for BasicJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FormLoaded => "form loaded",
            Self::WorkflowTabSelected => "workflow tab selected",
            Self::StepEditorOpen => "step editor open",
            Self::StepContentEntered => "step content entered",
            Self::StepSaved => "step saved",
            Self::StepEditorClosed => "step editor closed",
        };
        f.write_str(s)
    }
}

/// Job create/edit form page
#[derive(Debug, Clone)]
pub struct JobCreatePage<'a> {
    session: &'a Session,
    project: String,
    job_id: Option<String>,
}

impl<'a> JobCreatePage<'a> {
    /// Create form of the session's project
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            project: session.project().to_string(),
            job_id: None,
        }
    }

    /// Edit form of an existing job
    #[must_use]
    pub fn editing(session: &'a Session, job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::new(session)
        }
    }

    /// Job id the page is bound to, if editing
    #[must_use]
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    // accessors

    /// Job name input
    pub async fn job_name_input(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::JOB_NAME).await
    }

    /// Workflow tab
    pub async fn tab_workflow(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::TAB_WORKFLOW).await
    }

    /// Nodes tab
    pub async fn tab_nodes(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::TAB_NODES).await
    }

    /// "Command" entry of the add-step list
    pub async fn add_new_wf_step_command(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::ADD_WF_STEP_COMMAND).await
    }

    /// Remote command input
    pub async fn wf_step_command_remote_text(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::WF_STEP_COMMAND_REMOTE_TEXT).await
    }

    /// Block until the remote command input is displayed
    pub async fn wait_wf_step_command_remote_text(&self) -> ProbeResult<ElementHandle> {
        self.wait_for(
            &locators::WF_STEP_COMMAND_REMOTE_TEXT,
            self.session.config().timeouts.element(),
        )
        .await
    }

    /// Step 0 edit form
    pub async fn wf_step0_edit_form(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::WF_STEP0_EDIT_FORM).await
    }

    /// Step 0 save button
    pub async fn wf_step0_save_button(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::WF_STEP0_SAVE).await
    }

    /// Block until the rendered view of step 0 is displayed
    pub async fn wait_wf_step0_visible(&self) -> ProbeResult<ElementHandle> {
        self.wait_for(&locators::WF_STEP0_VIEW, self.session.config().timeouts.element())
            .await
    }

    /// "Dispatch to nodes" radio
    pub async fn dispatch_nodes(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::DISPATCH_NODES_TRUE).await
    }

    /// Node filter input
    pub async fn node_filter(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::NODE_FILTER).await
    }

    /// Node filter menu toggle
    pub async fn node_filter_menu_link(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::NODE_FILTER_MENU).await
    }

    /// "All nodes" filter entry
    pub async fn node_filter_select_all_link(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::NODE_FILTER_SELECT_ALL).await
    }

    /// Matched node summary, trimmed
    pub async fn matched_nodes_text(&self) -> ProbeResult<String> {
        self.read_text(&locators::MATCHED_NODES).await
    }

    /// Show excluded nodes "yes" radio
    pub async fn show_excluded_nodes_radio_yes(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::SHOW_EXCLUDED_YES).await
    }

    /// Editable filter "yes" radio
    pub async fn editable_filter_yes(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::EDITABLE_FILTER_YES).await
    }

    /// Thread count input
    pub async fn sched_jobnode_threadcount(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::THREADCOUNT).await
    }

    /// Rank attribute input
    pub async fn sched_jobnode_rank_attribute(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::RANK_ATTRIBUTE).await
    }

    /// Rank order "descending" radio
    pub async fn node_rank_order_descending(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::RANK_ORDER_DESCENDING).await
    }

    /// Keep going "true" radio
    pub async fn node_keepgoing_true(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::KEEPGOING_TRUE).await
    }

    /// Success on empty filter "true" radio
    pub async fn success_on_empty_node_filter_true(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::SUCCESS_ON_EMPTY_TRUE).await
    }

    /// Selected by default "false" radio
    pub async fn nodes_selected_by_default_false(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::SELECTED_BY_DEFAULT_FALSE).await
    }

    /// Orchestrator dropdown toggle
    pub async fn orchestrator_dropdown_button(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::ORCHESTRATOR_DROPDOWN).await
    }

    /// Orchestrator option carrying `value`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::OptionNotFound`] if the open dropdown has no
    /// such option.
    pub async fn orchestrator_choice(&self, value: &str) -> ProbeResult<ElementHandle> {
        let locator = Locator::new(
            format!("orchestrator choice {value}"),
            Selector::css(format!(
                "#orchestrator-edit-type-dropdown > ul > li > a[data-value=\"{value}\"]"
            )),
        );
        self.find(&locator)
            .await
            .map_err(|err| match err {
                ProbeError::ElementNotFound { .. } => ProbeError::OptionNotFound {
                    control: "orchestrator".to_string(),
                    value: value.to_string(),
                },
                other => other,
            })
    }

    /// Save on the create screen
    pub async fn save_button(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::SAVE).await
    }

    /// Save on the edit screen
    pub async fn edit_save_button(&self) -> ProbeResult<ElementHandle> {
        self.find(&locators::EDIT_SAVE).await
    }

    // compound flows

    /// Create a job named `name` with one command step, leaving the form
    /// open and unsaved with the step editor closed.
    ///
    /// The step edit form is captured before the step save is clicked; the
    /// flow only completes once that node has left the document.
    ///
    /// # Errors
    ///
    /// Returns the first lookup, driver or wait failure, unretried.
    pub async fn create_basic_job(&self, name: &str) -> ProbeResult<()> {
        let driver = self.session.driver();
        let timeouts = &self.session.config().timeouts;

        self.get().await?;
        let job_name = self.job_name_input().await?;
        driver.send_keys(&job_name, name).await?;
        self.advance(BasicJobState::FormLoaded);

        driver.click(&self.tab_workflow().await?).await?;
        self.advance(BasicJobState::WorkflowTabSelected);

        driver.click(&self.add_new_wf_step_command().await?).await?;
        let _ = self.wait_wf_step_command_remote_text().await?;
        self.advance(BasicJobState::StepEditorOpen);

        let remote_text = self.wf_step_command_remote_text().await?;
        driver.send_keys(&remote_text, BASIC_JOB_COMMAND).await?;
        self.advance(BasicJobState::StepContentEntered);

        let step_save = self.wf_step0_save_button().await?;
        let edit_form = self.wf_step0_edit_form().await?;
        driver.click(&step_save).await?;
        let _ = self.wait_wf_step0_visible().await?;
        self.advance(BasicJobState::StepSaved);

        let closed = Condition::staleness_of(edit_form, locators::WF_STEP0_EDIT_FORM.name());
        let _ = wait_until(driver, &closed, &timeouts.step_close()).await?;
        self.advance(BasicJobState::StepEditorClosed);

        info!(job = name, "basic job entered");
        Ok(())
    }

    /// Open the Nodes tab, enable dispatch and select all nodes, then check
    /// the fixture precondition on the matched node count.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::EnvironmentPrecondition`] if the summary does
    /// not report the configured node count.
    pub async fn enable_dispatch_all_nodes(&self) -> ProbeResult<String> {
        let driver = self.session.driver();
        let config = self.session.config();

        driver.click(&self.tab_nodes().await?).await?;
        driver.click(&self.dispatch_nodes().await?).await?;
        crate::wait::settle(config.timeouts.settle_ms, "node filter editor enable").await;

        let _ = self.node_filter().await?;
        driver.click(&self.node_filter_menu_link().await?).await?;
        driver.click(&self.node_filter_select_all_link().await?).await?;

        let text = self.matched_nodes_text().await?;
        let expected = matched_nodes_text(config.fixture.expected_matched_nodes);
        if text != expected {
            return Err(ProbeError::EnvironmentPrecondition {
                what: format!("nodes matched in project {}", self.project),
                expected,
                actual: text,
            });
        }
        debug!(matched = %text, "node filter applied");
        Ok(text)
    }

    /// Enter the remaining dispatch fields of `config` on the Nodes tab.
    ///
    /// Dispatch is already on after [`Self::enable_dispatch_all_nodes`]. A
    /// filter other than "all nodes" is typed over the selected one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a plan the form cannot take, else
    /// the first lookup or driver failure.
    pub async fn apply_dispatch(&self, config: &DispatchConfig) -> ProbeResult<()> {
        config.validate()?;
        if config.uses_custom_filter() {
            self.replace_text(&locators::NODE_FILTER, &config.node_filter)
                .await?;
        }
        self.click(radio(
            config.show_excluded,
            &locators::SHOW_EXCLUDED_YES,
            &locators::SHOW_EXCLUDED_NO,
        ))
        .await?;
        self.click(radio(
            config.editable_filter,
            &locators::EDITABLE_FILTER_YES,
            &locators::EDITABLE_FILTER_NO,
        ))
        .await?;
        self.replace_text(&locators::THREADCOUNT, &config.thread_count.to_string())
            .await?;
        self.replace_text(&locators::RANK_ATTRIBUTE, &config.rank_attribute)
            .await?;
        self.click(radio(
            config.rank_order_descending,
            &locators::RANK_ORDER_DESCENDING,
            &locators::RANK_ORDER_ASCENDING,
        ))
        .await?;
        self.click(radio(
            config.keep_going,
            &locators::KEEPGOING_TRUE,
            &locators::KEEPGOING_FALSE,
        ))
        .await?;
        self.click(radio(
            config.success_on_empty_node_filter,
            &locators::SUCCESS_ON_EMPTY_TRUE,
            &locators::SUCCESS_ON_EMPTY_FALSE,
        ))
        .await?;
        self.click(radio(
            config.selected_by_default,
            &locators::SELECTED_BY_DEFAULT_TRUE,
            &locators::SELECTED_BY_DEFAULT_FALSE,
        ))
        .await?;
        debug!(?config, "dispatch fields entered");
        Ok(())
    }

    /// Open the orchestrator dropdown and pick `kind`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::OptionNotFound`] if the option is not offered.
    pub async fn choose_orchestrator(&self, kind: OrchestratorKind) -> ProbeResult<()> {
        let driver = self.session.driver();
        driver.click(&self.orchestrator_dropdown_button().await?).await?;
        driver.click(&self.orchestrator_choice(kind.value()).await?).await?;
        debug!(orchestrator = %kind, "orchestrator chosen");
        Ok(())
    }

    /// Read every dispatch field back from the Nodes tab.
    ///
    /// Each boolean is read from the radio the form re-checks for it.
    ///
    /// # Errors
    ///
    /// Returns the first lookup or driver failure.
    pub async fn read_dispatch(&self) -> ProbeResult<DispatchReadback> {
        Ok(DispatchReadback {
            enabled: self.is_checked(&locators::DISPATCH_NODES_TRUE).await?,
            node_filter: self.read_value(&locators::NODE_FILTER).await?,
            show_excluded: self.is_checked(&locators::SHOW_EXCLUDED_YES).await?,
            editable_filter: self.is_checked(&locators::EDITABLE_FILTER_YES).await?,
            thread_count: self.read_value(&locators::THREADCOUNT).await?,
            rank_attribute: self.read_value(&locators::RANK_ATTRIBUTE).await?,
            rank_order_descending: self.is_checked(&locators::RANK_ORDER_DESCENDING).await?,
            keep_going: self.is_checked(&locators::KEEPGOING_TRUE).await?,
            success_on_empty_node_filter: self
                .is_checked(&locators::SUCCESS_ON_EMPTY_TRUE)
                .await?,
            selected_by_default: !self
                .is_checked(&locators::SELECTED_BY_DEFAULT_FALSE)
                .await?,
        })
    }

    /// Replace the job name (edit screen)
    ///
    /// # Errors
    ///
    /// Returns an error if the name input is missing.
    pub async fn rename(&self, name: &str) -> ProbeResult<()> {
        self.replace_text(&locators::JOB_NAME, name).await
    }

    fn advance(&self, state: BasicJobState) {
        debug!(page = self.page_name(), %state, "basic job");
    }
}

const fn radio<'l>(on: bool, yes: &'l Locator, no: &'l Locator) -> &'l Locator {
    if on {
        yes
    } else {
        no
    }
}

#[async_trait]
impl PageObject for JobCreatePage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn route(&self) -> Route {
        match &self.job_id {
            Some(id) => Route::JobEdit {
                project: self.project.clone(),
                id: id.clone(),
            },
            None => Route::JobCreate {
                project: self.project.clone(),
            },
        }
    }

    fn page_name(&self) -> &'static str {
        if self.job_id.is_some() {
            "job edit"
        } else {
            "job create"
        }
    }

    fn url_pattern(&self) -> &'static str {
        if self.job_id.is_some() {
            "/project/*/job/edit/*"
        } else {
            "/project/*/job/create"
        }
    }
}
