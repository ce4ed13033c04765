//! Output formatting and progress reporting

use console::{style, Style, Term};
use frametest::{PhaseOutcome, RunReport};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON run reports
    Json,
}

/// Progress reporter for fixture runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
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
            term: Term::stdout(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar on stderr; hidden when stderr is not a terminal
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || total < 2 {
            return;
        }

        let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
            pb.inc(1);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, message: &str) {
        let _ = match &self.progress_bar {
            Some(pb) => {
                pb.println(message);
                Ok(())
            }
            None => self.term.write_line(message),
        };
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

        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.line(&format!("{prefix} {message}"));
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

        self.line(&format!("{prefix} {message}"));
    }

    /// Print the outcome of one run, with per-phase detail when `detailed`
    pub fn report(&self, report: &RunReport, detailed: bool) {
        let title = format!(
            "{}::{} ({} frames)",
            report.fixture,
            report.test,
            report.total_frames()
        );
        match &report.failure {
            None => self.success(&title),
            Some(failure) => {
                self.failure(&title);
                for line in failure.lines() {
                    self.line(&format!("    {line}"));
                }
            }
        }

        if !detailed || self.quiet {
            return;
        }
        for phase in &report.phases {
            let status = match &phase.outcome {
                PhaseOutcome::Passed => self.paint("passed", &Style::new().green()),
                PhaseOutcome::Failed { .. } => self.paint("failed", &Style::new().red()),
                PhaseOutcome::Skipped => self.paint("skipped", &Style::new().yellow()),
            };
            self.line(&format!(
                "    {:<9} {:<20} {status} ({} frames)",
                phase.kind.as_str(),
                phase.name,
                phase.frames
            ));
        }
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Print the run summary
    pub fn summary(&self, passed: usize, failed: usize) {
        if self.quiet && failed == 0 {
            return;
        }

        let total = passed + failed;
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        let status = if self.use_color {
            let color = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            color.apply_to(status).to_string()
        } else {
            status.to_string()
        };

        self.line("");
        self.line(&format!(
            "{status} {total} tests ({passed} passed, {failed} failed)"
        ));
    }
}
