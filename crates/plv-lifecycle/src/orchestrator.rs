//! ---
//! plv_section: "03-lifecycle-verification"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Stage/activate/verify sequence driver."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plv_device::{
    DeviceSession, InspectError, PackageIdentity, PackageInspector, SessionError, StageVerdict,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::extension::ExtensionCheck;

/// Phases of one lifecycle attempt, in the only order they can occur.
///
/// There are no retry edges: each transition is attempted exactly once per
/// run. `ActivationFailed` and `Verified` are the terminal phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Nothing submitted yet.
    Idle,
    /// Staged install requested.
    Installing,
    /// Install accepted; activation pending reboot.
    Installed,
    /// Reboot in flight.
    Rebooting,
    /// Identity confirmed in the active set.
    Activated,
    /// Identity absent from the active set after reboot.
    ActivationFailed,
    /// Extension check passed; the lifecycle body is complete.
    Verified,
}

/// Reportable outcome of a lifecycle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The package staged, activated, and passed verification.
    Activated,
    /// The device rejected the staged install.
    FailedToInstall,
    /// The package did not appear in the active set after reboot.
    FailedToActivate,
}

/// Successful lifecycle result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    /// Identity resolved from the package file.
    pub identity: PackageIdentity,
    /// Always [`LifecycleOutcome::Activated`] on success.
    pub outcome: LifecycleOutcome,
    /// Terminal phase reached.
    pub phase: LifecyclePhase,
}

fn render_observed(observed: &[PackageIdentity]) -> String {
    observed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hard failures of the lifecycle sequence.
///
/// Each variant names the step that failed; activation failures carry the
/// full observed active set for diagnosis.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The device rejected the staged install. Deterministic; not retried.
    #[error("failed to stage install of {}: {reason}", .file.display())]
    Install {
        /// Package file that was submitted.
        file: PathBuf,
        /// Rejection message reported by the device.
        reason: String,
    },
    /// The installed identity is absent from the post-reboot active set.
    /// Not retried: activation that did not happen on boot will not happen
    /// with more waiting.
    #[error("failed to activate {expected}; active set after reboot: [{}]", render_observed(.observed))]
    Activation {
        /// Identity that should have activated.
        expected: PackageIdentity,
        /// Active set observed after reboot, sorted.
        observed: Vec<PackageIdentity>,
    },
    /// The caller-supplied extension check failed.
    #[error("extension check failed: {0}")]
    Extension(anyhow::Error),
    /// Transport failure talking to the device.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The package file could not be resolved to an identity.
    #[error(transparent)]
    Inspect(#[from] InspectError),
}

impl LifecycleError {
    /// The reportable outcome this failure corresponds to, when it maps to
    /// one of the lifecycle verdicts.
    pub fn outcome(&self) -> Option<LifecycleOutcome> {
        match self {
            Self::Install { .. } => Some(LifecycleOutcome::FailedToInstall),
            Self::Activation { .. } => Some(LifecycleOutcome::FailedToActivate),
            _ => None,
        }
    }
}

/// Drives the stage → reboot → verify → extension-check sequence for one
/// package.
///
/// Each step is a hard precondition for the next; any failure aborts the
/// remainder of the sequence. The orchestrator never resets device state —
/// that is [`crate::ResetGuard`]'s job — and never retries: every device
/// operation is assumed deterministic given device state.
pub struct LifecycleOrchestrator {
    session: Arc<dyn DeviceSession>,
    inspector: Arc<dyn PackageInspector>,
}

impl LifecycleOrchestrator {
    /// Build an orchestrator over the given device session and inspector.
    pub fn new(session: Arc<dyn DeviceSession>, inspector: Arc<dyn PackageInspector>) -> Self {
        Self { session, inspector }
    }

    /// Run the full lifecycle body for `file`.
    ///
    /// Ordering guarantees: install must return accepted before the reboot is
    /// issued; the reboot must return (device reachable) before the active
    /// set is queried; membership must be confirmed before the extension
    /// check runs.
    pub async fn run_lifecycle(
        &self,
        file: &Path,
        check: &dyn ExtensionCheck,
    ) -> Result<LifecycleReport, LifecycleError> {
        let identity = self.inspector.resolve_identity(file)?;

        info!(package = %identity, file = %file.display(), phase = ?LifecyclePhase::Installing, "staging install");
        match self.session.install_staged(file).await? {
            StageVerdict::Accepted => {
                debug!(package = %identity, phase = ?LifecyclePhase::Installed, "install staged");
            }
            StageVerdict::Rejected(reason) => {
                return Err(LifecycleError::Install {
                    file: file.to_path_buf(),
                    reason,
                });
            }
        }

        info!(package = %identity, phase = ?LifecyclePhase::Rebooting, "rebooting to activate");
        self.session.reboot().await?;

        let active = self.session.active_identities().await?;
        if !active.contains(&identity) {
            let mut observed: Vec<PackageIdentity> = active.into_iter().collect();
            observed.sort();
            info!(package = %identity, phase = ?LifecyclePhase::ActivationFailed, "package absent from active set");
            return Err(LifecycleError::Activation {
                expected: identity,
                observed,
            });
        }
        info!(package = %identity, phase = ?LifecyclePhase::Activated, "activation confirmed");

        check
            .verify(&active)
            .await
            .map_err(LifecycleError::Extension)?;

        info!(package = %identity, phase = ?LifecyclePhase::Verified, "lifecycle verified");
        Ok(LifecycleReport {
            identity,
            outcome: LifecycleOutcome::Activated,
            phase: LifecyclePhase::Verified,
        })
    }
}
