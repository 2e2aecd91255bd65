//! ---
//! plv_section: "03-lifecycle-verification"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Lifecycle verification core: orchestrator, reset guard, harness."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
//! Lifecycle verification for installable OS modules on a remote device.
//!
//! The protocol is a straight line: stage a package, reboot to activate,
//! verify it reports active, run a caller-supplied extra check, then tear
//! down by uninstalling and rebooting again. Every device operation blocks
//! for real wall-clock time and the device's installed state outlives the
//! process, so the interesting part is the discipline around it:
//!
//! * [`LifecycleOrchestrator`] drives the staged sequence, each step a hard
//!   precondition for the next, no retries anywhere.
//! * [`ResetGuard`] restores the "nothing of ours installed" baseline before
//!   and after every run, rebooting only when an uninstall actually removed
//!   something.
//! * [`VerificationHarness`] composes the two and guarantees teardown on
//!   every exit path, including failed activation and failed extension
//!   checks.

#![warn(missing_docs)]

pub mod extension;
pub mod harness;
pub mod orchestrator;
pub mod reset;

pub use extension::{ExtensionCheck, NoopCheck};
pub use harness::{HarnessError, RunVerdict, VerificationHarness};
pub use orchestrator::{
    LifecycleError, LifecycleOrchestrator, LifecycleOutcome, LifecyclePhase, LifecycleReport,
};
pub use reset::{ResetError, ResetGuard, ResetSummary};
