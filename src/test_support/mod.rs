//! Test doubles for Drydock unit tests.
//!
//! Products, legacy phases and event sinks here record what the
//! orchestrator asks of them so tests can assert on call order without
//! running any external tool.
//!
//! # Example
//!
//! ```rust,ignore
//! use drydock::test_support::{context_with, CallLog, RecordingProduct};
//!
//! #[test]
//! fn test_example() {
//!     let log = CallLog::new();
//!     let product = RecordingProduct::new("z3").log(&log);
//!     // Register, plan and run...
//!     assert_eq!(log.entries(), vec!["build z3 linux-x86_64"]);
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::builder::context::BuildContext;
use crate::builder::events::{BuildEvent, EventSink};
use crate::builder::legacy::{LegacyPhase, LegacyRequest};
use crate::builder::sdk::SdkLocator;
use crate::core::error::BuildError;
use crate::core::product::{Phase, Product};
use crate::core::target::BuildTarget;
use crate::util::config::Config;

pub use fixtures::*;

/// Host every test context is pinned to.
pub const TEST_HOST: &str = "linux-x86_64";

/// Shared, ordered record of phase invocations.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    /// Entries in call order, formatted as `<phase> <product> <target>`.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// A configurable product that records every phase it performs.
///
/// All three predicates answer `true` unless turned off with [`skip`].
///
/// [`skip`]: RecordingProduct::skip
#[derive(Debug, Clone)]
pub struct RecordingProduct {
    name: String,
    deps: Vec<String>,
    before_legacy: bool,
    legacy: bool,
    wanted: [bool; 3],
    fail_on: Option<Phase>,
    log: CallLog,
}

impl RecordingProduct {
    pub fn new(name: impl Into<String>) -> Self {
        RecordingProduct {
            name: name.into(),
            deps: Vec::new(),
            before_legacy: false,
            legacy: false,
            wanted: [true; 3],
            fail_on: None,
            log: CallLog::new(),
        }
    }

    pub fn deps(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn before_legacy(mut self) -> Self {
        self.before_legacy = true;
        self
    }

    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    /// Make the predicate for `phase` answer `false`.
    pub fn skip(mut self, phase: Phase) -> Self {
        self.wanted[phase_index(phase)] = false;
        self
    }

    /// Make `phase` fail with a tool error.
    pub fn fail_on(mut self, phase: Phase) -> Self {
        self.fail_on = Some(phase);
        self
    }

    /// Record into a shared log.
    pub fn log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    fn perform(&self, phase: Phase, target: &BuildTarget) -> Result<(), BuildError> {
        self.log.push(format!("{} {} {}", phase, self.name, target));
        if self.fail_on == Some(phase) {
            return Err(BuildError::ToolFailed {
                command: format!("{} {}", phase, self.name),
                code: Some(1),
                stderr: format!("{} of {} failed", phase, self.name),
            });
        }
        Ok(())
    }
}

fn phase_index(phase: Phase) -> usize {
    match phase {
        Phase::Build => 0,
        Phase::Test => 1,
        Phase::Install => 2,
    }
}

impl Product for RecordingProduct {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_before_legacy_phase(&self) -> bool {
        self.before_legacy
    }

    fn is_legacy_phase_product(&self) -> bool {
        self.legacy
    }

    fn dependencies(&self) -> Vec<&str> {
        self.deps.iter().map(String::as_str).collect()
    }

    fn should_build(&self, _ctx: &BuildContext, _target: &BuildTarget) -> bool {
        self.wanted[0]
    }

    fn build(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.perform(Phase::Build, target)
    }

    fn should_test(&self, _ctx: &BuildContext, _target: &BuildTarget) -> bool {
        self.wanted[1]
    }

    fn test(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.perform(Phase::Test, target)
    }

    fn should_install(&self, _ctx: &BuildContext, _target: &BuildTarget) -> bool {
        self.wanted[2]
    }

    fn install(&self, _ctx: &BuildContext, target: &BuildTarget) -> Result<(), BuildError> {
        self.perform(Phase::Install, target)
    }
}

/// Legacy phase that records each invocation instead of running a script.
#[derive(Debug, Default)]
pub struct RecordingLegacyPhase {
    runs: Mutex<Vec<(String, Vec<LegacyRequest>)>>,
    fail: bool,
}

impl RecordingLegacyPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingLegacyPhase {
            runs: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// `(target, requests)` per invocation.
    pub fn runs(&self) -> Vec<(String, Vec<LegacyRequest>)> {
        self.runs.lock().unwrap().clone()
    }
}

impl LegacyPhase for RecordingLegacyPhase {
    fn run(
        &self,
        _ctx: &BuildContext,
        target: &BuildTarget,
        requests: &[LegacyRequest],
    ) -> Result<(), BuildError> {
        self.runs
            .lock()
            .unwrap()
            .push((target.to_string(), requests.to_vec()));
        if self.fail {
            return Err(BuildError::ToolFailed {
                command: "build-script-impl".into(),
                code: Some(2),
                stderr: "legacy phase failed".into(),
            });
        }
        Ok(())
    }
}

/// Event sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &BuildEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// SDK locator answering `<root>/<platform>.sdk`, or failing when missing.
#[derive(Debug, Clone)]
pub struct FixedSdkLocator {
    root: Option<PathBuf>,
}

impl FixedSdkLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FixedSdkLocator {
            root: Some(root.into()),
        }
    }

    /// A locator that never finds an SDK.
    pub fn missing() -> Self {
        FixedSdkLocator { root: None }
    }
}

impl SdkLocator for FixedSdkLocator {
    fn sdk_path(&self, platform: &str) -> Result<PathBuf, BuildError> {
        match &self.root {
            Some(root) => Ok(root.join(format!("{}.sdk", platform))),
            None => Err(BuildError::tool_not_found("xcrun", "no SDKs in tests")),
        }
    }
}

/// A context rooted at `root` with default configuration.
pub fn context_at(root: impl AsRef<Path>) -> BuildContext {
    let mut config = Config::default();
    config.targets.host = Some(TEST_HOST.into());
    BuildContext::from_config(config, root.as_ref())
        .unwrap()
        .with_sdk_locator(Arc::new(FixedSdkLocator::new("/SDKs")))
}

/// A context rooted at `/work` after `configure` adjusted the configuration.
pub fn context_with(configure: impl FnOnce(&mut Config)) -> BuildContext {
    let mut config = Config::default();
    config.targets.host = Some(TEST_HOST.into());
    configure(&mut config);
    BuildContext::from_config(config, Path::new("/work"))
        .unwrap()
        .with_sdk_locator(Arc::new(FixedSdkLocator::new("/SDKs")))
}
