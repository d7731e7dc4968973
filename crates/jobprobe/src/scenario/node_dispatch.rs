//! "create job with dispatch to nodes"

use super::{edit_from_show, save_and_open_definition, Scenario};
use crate::assertion::Assertion;
use crate::dispatch::{DefinitionText, DispatchConfig, ALL_NODES_FILTER};
use crate::page_object::PageObject;
use crate::pages::{JobCreatePage, JobsListPage};
use crate::result::ProbeResult;
use crate::session::Session;
use async_trait::async_trait;
use tracing::info;

/// Create a job with every dispatch field set, then check the show screen
/// renders it and the edit screen re-populates it.
#[derive(Debug, Clone)]
pub struct NodeDispatchScenario {
    /// Base job name
    pub job_name: String,
    /// Dispatch settings entered on the create screen
    pub dispatch: DispatchConfig,
}

impl Default for NodeDispatchScenario {
    fn default() -> Self {
        Self {
            job_name: "jobs with nodes".to_string(),
            dispatch: DispatchConfig {
                enabled: true,
                node_filter: ALL_NODES_FILTER.to_string(),
                show_excluded: true,
                editable_filter: true,
                thread_count: 3,
                rank_attribute: "arank".to_string(),
                rank_order_descending: true,
                keep_going: true,
                success_on_empty_node_filter: true,
                selected_by_default: false,
            },
        }
    }
}

#[async_trait]
impl Scenario for NodeDispatchScenario {
    fn id(&self) -> &'static str {
        "dispatch-to-nodes"
    }

    fn title(&self) -> &'static str {
        "create job with dispatch to nodes"
    }

    async fn run(&self, session: &Session) -> ProbeResult<()> {
        let name = session.job_name(&self.job_name);
        info!(scenario = self.id(), job = %name, "start");

        let form = JobCreatePage::new(session);
        form.create_basic_job(&name).await?;
        let _ = form.enable_dispatch_all_nodes().await?;
        form.apply_dispatch(&self.dispatch).await?;

        let show = save_and_open_definition(session, &form).await?;
        let expected = DefinitionText::render(&self.dispatch);
        let rendered = show.read_definition().await?;
        let check = Assertion::on("show");
        check.text("node filter", &expected.node_filter, &rendered.node_filter)?;
        check.text("thread count", &expected.thread_count, &rendered.thread_count)?;
        check.text("keep going", &expected.keep_going, &rendered.keep_going)?;
        check.text("rank order", &expected.rank_order, &rendered.rank_order)?;
        check.text(
            "selected by default",
            &expected.selected_by_default,
            &rendered.selected_by_default,
        )?;
        info!(scenario = self.id(), "definition rendered as entered");

        let edit = edit_from_show(session, &show).await?;
        session.driver().click(&edit.tab_nodes().await?).await?;
        let readback = edit.read_dispatch().await?;
        Assertion::on("edit").fields(
            &self.dispatch.expected_readback().fields(),
            &readback.fields(),
        )?;
        info!(scenario = self.id(), "edit form re-populated");

        JobsListPage::new(session).get().await
    }
}
