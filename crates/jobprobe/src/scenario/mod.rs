//! End-to-end scenarios over the job screens.
//!
//! Each scenario runs strictly in program order on one session and stops at
//! the first error. Steps shared by both scenarios live here.

mod node_dispatch;
mod orchestrator_rename;

pub use node_dispatch::NodeDispatchScenario;
pub use orchestrator_rename::OrchestratorRenameScenario;

use crate::page_object::PageObject;
use crate::pages::{JobCreatePage, JobShowPage};
use crate::result::{ProbeError, ProbeResult};
use crate::routes::{edit_url_from_show, job_id_from_url};
use crate::session::Session;
use crate::wait::settle;
use async_trait::async_trait;
use tracing::info;

/// A named end-to-end flow
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable identifier used on the command line and in reports
    fn id(&self) -> &'static str;

    /// Human-readable title
    fn title(&self) -> &'static str;

    /// Drive the application through the flow
    async fn run(&self, session: &Session) -> ProbeResult<()>;
}

/// Every scenario, in execution order
#[must_use]
pub fn catalog() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(NodeDispatchScenario::default()),
        Box::new(OrchestratorRenameScenario::default()),
    ]
}

/// Look up a scenario by id
#[must_use]
pub fn by_id(id: &str) -> Option<Box<dyn Scenario>> {
    catalog().into_iter().find(|s| s.id() == id)
}

/// Save the new job, land on its show page and open the definition modal.
async fn save_and_open_definition<'a>(
    session: &'a Session,
    form: &JobCreatePage<'_>,
) -> ProbeResult<JobShowPage<'a>> {
    session.driver().click(&form.save_button().await?).await?;
    let show = JobShowPage::new(session);
    show.open_job_definition().await?;
    let url = session.current_url().await?;
    info!(url = %url, "job saved");
    Ok(show)
}

/// Close the modal and open the edit form of the shown job.
///
/// Fails with a navigation error, before leaving the show screen, when its
/// URL carries no job id.
async fn edit_from_show<'a>(
    session: &'a Session,
    show: &JobShowPage<'_>,
) -> ProbeResult<JobCreatePage<'a>> {
    show.close_job_definition_modal().await?;
    settle(
        session.config().timeouts.settle_ms,
        "definition modal close animation",
    )
    .await;

    let show_url = session.current_url().await?;
    let edit_url = edit_url_from_show(&show_url)?;
    let job_id = job_id_from_url(&edit_url).ok_or_else(|| ProbeError::Navigation {
        url: show_url.clone(),
        message: "show URL carries no job id".to_string(),
    })?;
    session.navigate(&edit_url).await?;

    let edit = JobCreatePage::editing(session, job_id);
    edit.wait_loaded().await?;
    Ok(edit)
}
