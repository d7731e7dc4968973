//! "rename job with orchestrator"

use super::{edit_from_show, save_and_open_definition, Scenario};
use crate::assertion::Assertion;
use crate::dispatch::OrchestratorKind;
use crate::page_object::PageObject;
use crate::pages::{JobCreatePage, JobShowPage, JobsListPage};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{wait_until, Condition};
use async_trait::async_trait;
use tracing::info;

/// Create a job with an orchestrator, check its label, then rename it and
/// wait for the full reload back to the show screen.
///
/// After the reload the show screen must carry the new name while the
/// orchestrator label and the dispatch sentences stay as first saved.
#[derive(Debug, Clone)]
pub struct OrchestratorRenameScenario {
    /// Base job name
    pub job_name: String,
    /// Base name after the rename
    pub renamed_to: String,
    /// Orchestrator chosen on the create screen
    pub orchestrator: OrchestratorKind,
}

impl Default for OrchestratorRenameScenario {
    fn default() -> Self {
        Self {
            job_name: "job with node orchestrator".to_string(),
            renamed_to: "renamed job with node orchestrator".to_string(),
            orchestrator: OrchestratorKind::RankTiered,
        }
    }
}

#[async_trait]
impl Scenario for OrchestratorRenameScenario {
    fn id(&self) -> &'static str {
        "rename-with-orchestrator"
    }

    fn title(&self) -> &'static str {
        "rename job with orchestrator"
    }

    async fn run(&self, session: &Session) -> ProbeResult<()> {
        let name = session.job_name(&self.job_name);
        info!(scenario = self.id(), job = %name, "start");

        let form = JobCreatePage::new(session);
        form.create_basic_job(&name).await?;
        let _ = form.enable_dispatch_all_nodes().await?;
        form.choose_orchestrator(self.orchestrator).await?;

        let show = save_and_open_definition(session, &form).await?;
        let label = show.job_definition_orchestrator_text().await?;
        Assertion::on("show").text("orchestrator", self.orchestrator.label(), &label)?;
        let saved = show.read_definition().await?;

        let edit = edit_from_show(session, &show).await?;
        let renamed = session.job_name(&self.renamed_to);
        edit.rename(&renamed).await?;
        session.driver().click(&edit.edit_save_button().await?).await?;

        let reloaded = wait_until(
            session.driver(),
            &Condition::url_contains("/job/show"),
            &session.config().timeouts.reload(),
        )
        .await?;
        info!(
            scenario = self.id(),
            job = %renamed,
            elapsed_ms = reloaded.elapsed.as_millis() as u64,
            "renamed"
        );

        let show = JobShowPage::new(session);
        let shown_name = show.job_name_text().await?;
        let check = Assertion::on("show");
        check.text("job name", &renamed, &shown_name)?;
        show.open_job_definition().await?;
        let label = show.job_definition_orchestrator_text().await?;
        check.text("orchestrator", self.orchestrator.label(), &label)?;
        check.fields(&saved.fields(), &show.read_definition().await?.fields())?;
        info!(scenario = self.id(), "rename kept orchestrator and dispatch");

        JobsListPage::new(session).get().await
    }
}
