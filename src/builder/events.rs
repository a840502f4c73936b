//! Build events and where they are reported.
//!
//! With `--message-format=json` every event is printed as a single JSON
//! object per line, tagged by `reason`:
//!
//! - `build-started`: the plan is about to run
//! - `phase-started` / `phase-finished` / `phase-failed`: a product phase ran
//! - `phase-skipped`: a product's predicate declined a phase
//! - `legacy-phase`: the legacy block was handed to the legacy phase
//! - `build-finished`: the run completed (success or failure)
//!
//! New fields may be added, but existing fields are not removed or renamed.

use std::str::FromStr;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::builder::legacy::LegacyRequest;
use crate::core::product::Phase;

/// An event emitted while a plan runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Targets in the order they run
        targets: Vec<String>,
        /// Number of products in the plan
        products: usize,
        /// Product phases that may run (products x targets x phases)
        steps: u64,
    },

    #[serde(rename = "phase-started")]
    PhaseStarted {
        product: String,
        target: String,
        phase: Phase,
    },

    #[serde(rename = "phase-finished")]
    PhaseFinished {
        product: String,
        target: String,
        phase: Phase,
        duration_ms: u64,
    },

    #[serde(rename = "phase-skipped")]
    PhaseSkipped {
        product: String,
        target: String,
        phase: Phase,
    },

    #[serde(rename = "phase-failed")]
    PhaseFailed {
        product: String,
        target: String,
        phase: Phase,
        message: String,
    },

    #[serde(rename = "legacy-phase")]
    LegacyPhase {
        target: String,
        requests: Vec<LegacyRequest>,
    },

    #[serde(rename = "build-finished")]
    BuildFinished {
        success: bool,
        duration_ms: u64,
        /// Phases that actually ran
        phases_run: u64,
    },
}

impl BuildEvent {
    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// How events are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(MessageFormat::Human),
            "json" => Ok(MessageFormat::Json),
            other => Err(format!("unknown message format `{}` (expected human or json)", other)),
        }
    }
}

/// Receives events as the orchestrator produces them.
pub trait EventSink {
    fn emit(&self, event: &BuildEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &BuildEvent) {}
}

/// Prints events to the terminal.
///
/// Human output goes to stderr as status lines with a progress bar; JSON
/// output goes to stdout, one event per line.
pub struct ConsoleSink {
    format: MessageFormat,
    verbose: bool,
    progress: ProgressBar,
}

impl ConsoleSink {
    pub fn new(format: MessageFormat, verbose: bool) -> Self {
        ConsoleSink {
            format,
            verbose,
            progress: ProgressBar::hidden(),
        }
    }

    fn status(&self, verb: &str, message: impl AsRef<str>) {
        self.progress
            .suspend(|| eprintln!("{:>12} {}", verb, message.as_ref()));
    }

    fn start_progress(&self, steps: u64) {
        if self.verbose || steps <= 1 {
            return;
        }
        self.progress.set_length(steps);
        self.progress
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            self.progress.set_style(style.progress_chars("#>-"));
        }
    }

    fn human(&self, event: &BuildEvent) {
        match event {
            BuildEvent::BuildStarted { steps, .. } => self.start_progress(*steps),
            BuildEvent::PhaseStarted {
                product,
                target,
                phase,
            } => {
                self.progress.set_message(format!("{} {}", phase, product));
                self.status(phase.verb(), format!("{} ({})", product, target));
            }
            BuildEvent::PhaseFinished { .. } => self.progress.inc(1),
            BuildEvent::PhaseSkipped {
                product,
                target,
                phase,
            } => {
                if self.verbose {
                    self.status("Skipping", format!("{} of {} ({})", phase, product, target));
                }
                self.progress.inc(1);
            }
            BuildEvent::PhaseFailed { .. } => self.progress.abandon(),
            BuildEvent::LegacyPhase { target, requests } => {
                let products: Vec<&str> = requests.iter().map(|r| r.product.as_str()).collect();
                self.status("Legacy", format!("{} ({})", products.join(", "), target));
                self.progress.inc(3 * requests.len() as u64);
            }
            BuildEvent::BuildFinished {
                success,
                duration_ms,
                phases_run,
            } => {
                self.progress.finish_and_clear();
                if *success {
                    let elapsed = Duration::from_millis(*duration_ms);
                    self.status(
                        "Finished",
                        format!("{} phase(s) in {:.2}s", phases_run, elapsed.as_secs_f64()),
                    );
                }
            }
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &BuildEvent) {
        match self.format {
            MessageFormat::Human => self.human(event),
            MessageFormat::Json => println!("{}", event.to_json()),
        }
    }
}
