//! `jobprobe run`

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use jobprobe::scenario::{self, Scenario};
use jobprobe::{HarnessConfig, ScenarioRunner, SuiteReport};
use std::path::Path;
use tracing::info;

/// Resolve scenario ids against the catalog; no ids means all of them
pub fn select(ids: &[String]) -> CliResult<Vec<Box<dyn Scenario>>> {
    if ids.is_empty() {
        return Ok(scenario::catalog());
    }
    ids.iter()
        .map(|id| {
            scenario::by_id(id).ok_or_else(|| {
                CliError::invalid_argument(format!(
                    "unknown scenario {id:?} (see `jobprobe list`)"
                ))
            })
        })
        .collect()
}

/// Effective harness configuration for a run
pub fn harness_config(args: &RunArgs) -> CliResult<HarnessConfig> {
    let mut config = args.source.resolve()?;
    if args.headed {
        config.browser = config.browser.with_headless(false);
    }
    if let Some(dir) = &args.artifacts_dir {
        config = config.with_artifacts_dir(dir);
    }
    Ok(config)
}

/// Run the selected scenarios in one browser session
pub fn execute(cli: &CliConfig, args: &RunArgs) -> CliResult<()> {
    crate::logging::init(cli.verbosity, args.log_json);

    let scenarios = select(&args.scenarios)?;
    let config = harness_config(args)?;
    let runner = if args.fail_fast {
        ScenarioRunner::new().with_fail_fast()
    } else {
        ScenarioRunner::new()
    };

    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    reporter.info(&format!(
        "{} scenario(s) against {} (project {})",
        scenarios.len(),
        config.base_url(),
        config.project
    ));
    reporter.start_spinner("running scenarios");

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_suite(config, runner, &scenarios));
    reporter.finish();
    let report = result?;

    reporter.report(&report);
    if let Some(path) = &args.report {
        write_report(&report, path)?;
        reporter.info(&format!("report written to {}", path.display()));
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.outcomes.len(),
        })
    }
}

#[cfg(feature = "browser")]
async fn run_suite(
    config: HarnessConfig,
    runner: ScenarioRunner,
    scenarios: &[Box<dyn Scenario>],
) -> CliResult<SuiteReport> {
    let session = jobprobe::Session::launch(config).await?;
    let result = runner.run(&session, scenarios).await;
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "browser did not close cleanly");
    }
    Ok(result?)
}

#[cfg(not(feature = "browser"))]
async fn run_suite(
    _config: HarnessConfig,
    _runner: ScenarioRunner,
    _scenarios: &[Box<dyn Scenario>],
) -> CliResult<SuiteReport> {
    Err(CliError::config(
        "built without the `browser` feature; rebuild with --features browser",
    ))
}

fn write_report(report: &SuiteReport, path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    report.write_json(path)?;
    info!(path = %path.display(), "suite report written");
    Ok(())
}
