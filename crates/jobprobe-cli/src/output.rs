//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use jobprobe::{ScenarioOutcome, Status, SuiteReport};
use std::time::Duration;

/// Progress reporter for a scenario run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while the suite runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    /// Remove the spinner
    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a skip message
    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("-").yellow().bold().to_string()
        } else {
            "SKIP".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print one scenario outcome with its error and screenshot, if any
    pub fn outcome(&self, outcome: &ScenarioOutcome) {
        let line = format_outcome(outcome);
        match outcome.status {
            Status::Passed => self.success(&line),
            Status::Skipped => self.skipped(&line),
            Status::Failed => {
                self.failure(&line);
                if let Some(error) = &outcome.error {
                    let _ = self.term.write_line(&format!("    {error}"));
                }
                if let Some(shot) = &outcome.screenshot {
                    let _ = self
                        .term
                        .write_line(&format!("    screenshot: {}", shot.display()));
                }
            }
        }
    }

    /// Print every outcome followed by the totals line
    pub fn report(&self, report: &SuiteReport) {
        for outcome in &report.outcomes {
            self.outcome(outcome);
        }
        self.summary(
            report.passed_count(),
            report.failed_count(),
            report.skipped_count(),
            Duration::from_millis(report.duration_ms),
        );
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let _ = self.term.write_line(&summary_line(passed, failed, skipped, duration));
        }
    }
}

fn format_outcome(outcome: &ScenarioOutcome) -> String {
    match outcome.status {
        Status::Skipped => format!("{} ({})", outcome.title, outcome.id),
        _ => format!(
            "{} ({}) {:.2}s",
            outcome.title,
            outcome.id,
            Duration::from_millis(outcome.duration_ms).as_secs_f64()
        ),
    }
}

fn summary_line(passed: usize, failed: usize, skipped: usize, duration: Duration) -> String {
    let status = if failed > 0 { "FAILED" } else { "PASSED" };
    let total = passed + failed + skipped;
    format!(
        "{status} {total} scenarios in {:.2}s ({passed} passed, {failed} failed, {skipped} skipped)",
        duration.as_secs_f64()
    )
}
