//! ---
//! plv_section: "03-lifecycle-verification"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Guarded verification run composing orchestrator and reset guard."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use plv_common::HarnessConfig;
use plv_device::{DeviceSession, PackageInspector, SessionError};
use thiserror::Error;
use tracing::{info, warn};

use crate::extension::ExtensionCheck;
use crate::orchestrator::{LifecycleError, LifecycleOrchestrator, LifecycleReport};
use crate::reset::{ResetError, ResetGuard};

/// Final verdict of a guarded verification run.
#[derive(Debug)]
pub enum RunVerdict {
    /// The lifecycle completed and the extension check passed.
    Verified(LifecycleReport),
    /// The environment is inapplicable; nothing was attempted. Not a failure.
    Skipped {
        /// Why the run was skipped.
        reason: String,
    },
}

/// Failures of a guarded run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The harness was constructed without any package files.
    #[error("no package files configured")]
    NoPackageFiles,
    /// The lifecycle body failed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// A reset pass failed.
    #[error(transparent)]
    Reset(#[from] ResetError),
    /// Transport failure outside the lifecycle body.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Per-run composition of the lifecycle sequence and its reset discipline.
///
/// Construct one per verification run; the harness holds the configured
/// package files and the device session handle and is not shared across
/// runs. `run` is the only entry point and owns the cleanup guarantee.
pub struct VerificationHarness {
    session: Arc<dyn DeviceSession>,
    orchestrator: LifecycleOrchestrator,
    reset: ResetGuard,
    package_files: Vec<PathBuf>,
}

impl VerificationHarness {
    /// Build a harness. The first package file is the one staged and
    /// activated; every file is swept during reset.
    pub fn new(
        session: Arc<dyn DeviceSession>,
        inspector: Arc<dyn PackageInspector>,
        package_files: Vec<PathBuf>,
    ) -> Result<Self, HarnessError> {
        if package_files.is_empty() {
            return Err(HarnessError::NoPackageFiles);
        }
        Ok(Self {
            orchestrator: LifecycleOrchestrator::new(session.clone(), inspector.clone()),
            reset: ResetGuard::new(session.clone(), inspector),
            session,
            package_files,
        })
    }

    /// Build a harness from a loaded configuration.
    pub fn from_config(
        config: &HarnessConfig,
        session: Arc<dyn DeviceSession>,
        inspector: Arc<dyn PackageInspector>,
    ) -> Result<Self, HarnessError> {
        Self::new(session, inspector, config.package_files.clone())
    }

    /// Run the guarded verification sequence.
    ///
    /// Order: capability gate, pre-run reset, lifecycle body, teardown. The
    /// teardown (stray-session cleanup plus a second reset) runs on every
    /// exit path of the body, including activation and extension-check
    /// failures. When both the body and the teardown fail, the body's error
    /// wins and the teardown failure is logged.
    pub async fn run(&self, check: &dyn ExtensionCheck) -> Result<RunVerdict, HarnessError> {
        if !self.session.update_supported().await? {
            let reason = "device does not support package updates".to_owned();
            info!(%reason, "skipping verification run");
            return Ok(RunVerdict::Skipped { reason });
        }

        let body = async {
            self.reset.reset_to_baseline(&self.package_files).await?;
            let report = self
                .orchestrator
                .run_lifecycle(&self.package_files[0], check)
                .await?;
            Ok::<LifecycleReport, HarnessError>(report)
        };
        let outcome = body.await;

        let teardown = self.teardown().await;
        match (outcome, teardown) {
            (Ok(report), Ok(())) => Ok(RunVerdict::Verified(report)),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(teardown_err)) => {
                warn!(error = %teardown_err, "teardown failed after run failure");
                Err(err)
            }
        }
    }

    async fn teardown(&self) -> Result<(), HarnessError> {
        self.session.abandon_install_sessions().await?;
        self.reset.reset_to_baseline(&self.package_files).await?;
        Ok(())
    }
}
