//! ---
//! plv_section: "03-lifecycle-verification"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Idempotent device-state reset to the clean baseline."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use plv_device::{
    DeviceSession, InspectError, PackageIdentity, PackageInspector, SessionError, UninstallVerdict,
};
use thiserror::Error;
use tracing::{debug, info};

/// What a reset pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetSummary {
    /// Identities whose uninstall was effectful.
    pub removed: Vec<PackageIdentity>,
    /// Identities that were already absent; no action taken.
    pub already_absent: Vec<PackageIdentity>,
    /// Reboots performed, one per effectful uninstall.
    pub reboots: usize,
}

impl ResetSummary {
    /// Whether the baseline already held and the pass changed nothing.
    pub fn was_noop(&self) -> bool {
        self.removed.is_empty() && self.reboots == 0
    }
}

/// Failures while restoring the baseline.
#[derive(Debug, Error)]
pub enum ResetError {
    /// The device refused an uninstall for a real reason. Distinct from the
    /// benign "nothing installed under that name" case, which is a logged
    /// no-op.
    #[error("uninstall of {name} failed: {reason}")]
    Uninstall {
        /// Targeted module name.
        name: String,
        /// Failure message reported by the device.
        reason: String,
    },
    /// Transport failure talking to the device.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// A configured package file could not be resolved to an identity.
    #[error(transparent)]
    Inspect(#[from] InspectError),
}

/// Restores the "no package of ours is installed" baseline.
///
/// Runs before the lifecycle body as a precondition and after it
/// unconditionally, independent of outcome. Reboots are expensive, so the
/// pass is asymmetric: an uninstall that actually removed something is
/// followed by a reboot to let the removal take effect, while an uninstall
/// that found nothing installed is a logged no-op with no reboot. Two
/// consecutive passes over a clean device therefore perform zero reboots.
pub struct ResetGuard {
    session: Arc<dyn DeviceSession>,
    inspector: Arc<dyn PackageInspector>,
}

impl ResetGuard {
    /// Build a guard over the given device session and inspector.
    pub fn new(session: Arc<dyn DeviceSession>, inspector: Arc<dyn PackageInspector>) -> Self {
        Self { session, inspector }
    }

    /// Sweep every configured package file back to the uninstalled baseline.
    pub async fn reset_to_baseline(&self, files: &[PathBuf]) -> Result<ResetSummary, ResetError> {
        let mut summary = ResetSummary::default();
        for file in files {
            let identity = self.inspector.resolve_identity(file)?;
            debug!(package = %identity, "sweeping package");
            match self.session.uninstall(&identity.name).await? {
                UninstallVerdict::Removed => {
                    info!(package = %identity, "uninstalled; rebooting for removal to take effect");
                    self.session.reboot().await?;
                    summary.reboots += 1;
                    summary.removed.push(identity);
                }
                UninstallVerdict::NotInstalled => {
                    info!(package = %identity, "not installed, likely already on factory version");
                    summary.already_absent.push(identity);
                }
                UninstallVerdict::Failed(reason) => {
                    return Err(ResetError::Uninstall {
                        name: identity.name,
                        reason,
                    });
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use plv_device::{DeviceCall, SimDevice};

    const MEDIA_FILE: &str = "media.pkg";

    fn media_identity() -> PackageIdentity {
        PackageIdentity::new("com.example.media", 2)
    }

    fn guard_over(device: SimDevice) -> (Arc<SimDevice>, ResetGuard) {
        let inspector = Arc::new(device.inspector());
        let device = Arc::new(device);
        let guard = ResetGuard::new(device.clone(), inspector);
        (device, guard)
    }

    #[tokio::test]
    async fn clean_device_reset_is_a_pure_noop_twice() {
        let (device, guard) =
            guard_over(SimDevice::new().provision(MEDIA_FILE, media_identity()));
        let files = vec![PathBuf::from(MEDIA_FILE)];

        let first = guard.reset_to_baseline(&files).await.expect("first pass");
        let second = guard.reset_to_baseline(&files).await.expect("second pass");
        assert!(first.was_noop());
        assert!(second.was_noop());
        assert_eq!(device.reboot_count(), 0);
        assert!(!device.calls().contains(&DeviceCall::Reboot));
    }

    #[tokio::test]
    async fn leftover_package_is_removed_and_reboot_follows() {
        let (device, guard) = guard_over(
            SimDevice::new()
                .provision(MEDIA_FILE, media_identity())
                .preinstall(media_identity()),
        );
        let files = vec![PathBuf::from(MEDIA_FILE)];

        let summary = guard.reset_to_baseline(&files).await.expect("reset runs");
        assert_eq!(summary.removed, vec![media_identity()]);
        assert_eq!(summary.reboots, 1);
        assert!(device.active().is_empty());

        // Baseline now holds; the next pass must not reboot again.
        let again = guard.reset_to_baseline(&files).await.expect("reset runs");
        assert!(again.was_noop());
        assert_eq!(device.reboot_count(), 1);
    }

    #[tokio::test]
    async fn real_uninstall_failure_is_an_error_not_a_noop() {
        let (_, guard) = guard_over(
            SimDevice::new()
                .provision(MEDIA_FILE, media_identity())
                .preinstall(media_identity())
                .with_uninstall_failure("com.example.media", "device is locked"),
        );
        let err = guard
            .reset_to_baseline(&[PathBuf::from(MEDIA_FILE)])
            .await
            .expect_err("uninstall failure propagates");
        assert!(matches!(err, ResetError::Uninstall { ref name, .. } if name == "com.example.media"));
    }

    #[tokio::test]
    async fn every_configured_file_is_swept() {
        let net = PackageIdentity::new("com.example.net", 1);
        let (device, guard) = guard_over(
            SimDevice::new()
                .provision(MEDIA_FILE, media_identity())
                .provision("net.pkg", net.clone())
                .preinstall(media_identity())
                .preinstall(net.clone()),
        );
        let files = vec![PathBuf::from(MEDIA_FILE), PathBuf::from("net.pkg")];

        let summary = guard.reset_to_baseline(&files).await.expect("reset runs");
        assert_eq!(summary.removed.len(), 2);
        assert_eq!(summary.reboots, 2);
        assert!(device.active().is_empty());
    }
}
