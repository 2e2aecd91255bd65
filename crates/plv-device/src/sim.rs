//! ---
//! plv_section: "02-device-interface"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Scripted in-memory device simulator."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
//! A scripted stand-in for a real target device.
//!
//! [`SimDevice`] keeps installed/active package state in memory with the same
//! staging semantics as hardware: installs and uninstalls only take effect at
//! the next reboot. Every session call is appended to an ordered log so tests
//! can assert sequencing, and fault-injection knobs reproduce the failure
//! modes the harness must survive.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::identity::PackageIdentity;
use crate::inspect::{InspectError, PackageInspector};
use crate::session::{
    DeviceSession, SessionError, StageVerdict, UninstallVerdict, BOOT_COMPLETE_TIMEOUT,
};

/// One recorded session call, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    /// Capability query.
    UpdateSupported,
    /// Staged install request for the given file.
    InstallStaged {
        /// File submitted for staging.
        file: PathBuf,
    },
    /// Active-set query.
    ActiveQuery,
    /// Uninstall-by-name request.
    Uninstall {
        /// Targeted module name.
        name: String,
    },
    /// Full reboot.
    Reboot,
    /// Stray-session cleanup.
    AbandonSessions,
}

#[derive(Debug, Default)]
struct SimState {
    active: HashSet<PackageIdentity>,
    // Installed but not reported active, e.g. a package that failed to
    // activate on boot. Still present on disk, so uninstall is effectful.
    dormant: HashSet<PackageIdentity>,
    staged: Vec<PackageIdentity>,
    pending_removal: Vec<String>,
    calls: Vec<DeviceCall>,
    reboots: usize,
}

/// Scripted in-memory device.
///
/// Build with the `with_*` knobs before handing it to the harness:
///
/// ```
/// use plv_device::{PackageIdentity, SimDevice};
///
/// let device = SimDevice::new()
///     .provision("media.pkg", PackageIdentity::new("com.example.media", 2))
///     .with_update_support(true);
/// let inspector = device.inspector();
/// ```
#[derive(Debug)]
pub struct SimDevice {
    state: Mutex<SimState>,
    catalog: HashMap<PathBuf, PackageIdentity>,
    update_supported: bool,
    reject_install: Option<String>,
    activation_dropout: HashSet<PackageIdentity>,
    uninstall_failures: HashMap<String, String>,
    boot_duration: Duration,
    boot_timeout: Duration,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDevice {
    /// A device with update support enabled and nothing installed.
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            catalog: HashMap::new(),
            update_supported: true,
            reject_install: None,
            activation_dropout: HashSet::new(),
            uninstall_failures: HashMap::new(),
            boot_duration: Duration::ZERO,
            boot_timeout: BOOT_COMPLETE_TIMEOUT,
        }
    }

    /// Register a package file the device will recognize when staged.
    pub fn provision(mut self, file: impl Into<PathBuf>, identity: PackageIdentity) -> Self {
        self.catalog.insert(file.into(), identity);
        self
    }

    /// Seed an identity as already active, as leftover state from a previous
    /// run would be.
    pub fn preinstall(self, identity: PackageIdentity) -> Self {
        self.state.lock().active.insert(identity);
        self
    }

    /// Toggle the update-support capability flag.
    pub fn with_update_support(mut self, supported: bool) -> Self {
        self.update_supported = supported;
        self
    }

    /// Reject every staged install with the given message.
    pub fn with_install_rejection(mut self, reason: impl Into<String>) -> Self {
        self.reject_install = Some(reason.into());
        self
    }

    /// Make the given identity silently fail to activate on reboot.
    pub fn with_activation_dropout(mut self, identity: PackageIdentity) -> Self {
        self.activation_dropout.insert(identity);
        self
    }

    /// Script how long the device takes to come back after a reboot, and the
    /// budget the session applies while waiting (defaults to
    /// [`BOOT_COMPLETE_TIMEOUT`]). A boot slower than the budget makes
    /// `reboot` fail with [`SessionError::BootTimeout`]; no simulated clock
    /// actually runs.
    pub fn with_boot_behaviour(mut self, boot_duration: Duration, boot_timeout: Duration) -> Self {
        self.boot_duration = boot_duration;
        self.boot_timeout = boot_timeout;
        self
    }

    /// Fail uninstalls of the named module with a real error.
    pub fn with_uninstall_failure(
        mut self,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.uninstall_failures.insert(name.into(), reason.into());
        self
    }

    /// An inspector resolving exactly the files this device recognizes.
    pub fn inspector(&self) -> StaticInspector {
        StaticInspector {
            catalog: self.catalog.clone(),
        }
    }

    /// Ordered log of every session call issued so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.lock().calls.clone()
    }

    /// Number of reboots performed so far.
    pub fn reboot_count(&self) -> usize {
        self.state.lock().reboots
    }

    /// Snapshot of the currently active identities.
    pub fn active(&self) -> HashSet<PackageIdentity> {
        self.state.lock().active.clone()
    }

    fn record(&self, call: DeviceCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl DeviceSession for SimDevice {
    async fn update_supported(&self) -> Result<bool, SessionError> {
        self.record(DeviceCall::UpdateSupported);
        Ok(self.update_supported)
    }

    async fn install_staged(&self, file: &Path) -> Result<StageVerdict, SessionError> {
        self.record(DeviceCall::InstallStaged {
            file: file.to_path_buf(),
        });
        if let Some(reason) = &self.reject_install {
            return Ok(StageVerdict::Rejected(reason.clone()));
        }
        match self.catalog.get(file) {
            Some(identity) => {
                debug!(package = %identity, "sim: package staged");
                self.state.lock().staged.push(identity.clone());
                Ok(StageVerdict::Accepted)
            }
            None => Ok(StageVerdict::Rejected(format!(
                "unrecognized package file {}",
                file.display()
            ))),
        }
    }

    async fn active_identities(&self) -> Result<HashSet<PackageIdentity>, SessionError> {
        self.record(DeviceCall::ActiveQuery);
        Ok(self.state.lock().active.clone())
    }

    async fn uninstall(&self, name: &str) -> Result<UninstallVerdict, SessionError> {
        self.record(DeviceCall::Uninstall {
            name: name.to_owned(),
        });
        if let Some(reason) = self.uninstall_failures.get(name) {
            return Ok(UninstallVerdict::Failed(reason.clone()));
        }
        let mut state = self.state.lock();
        let known = state.active.iter().any(|id| id.name == name)
            || state.dormant.iter().any(|id| id.name == name)
            || state.staged.iter().any(|id| id.name == name);
        if !known {
            return Ok(UninstallVerdict::NotInstalled);
        }
        state.staged.retain(|id| id.name != name);
        state.pending_removal.push(name.to_owned());
        Ok(UninstallVerdict::Removed)
    }

    async fn reboot(&self) -> Result<(), SessionError> {
        self.record(DeviceCall::Reboot);
        if self.boot_duration > self.boot_timeout {
            return Err(SessionError::BootTimeout {
                timeout: self.boot_timeout,
            });
        }
        let mut state = self.state.lock();
        state.reboots += 1;
        let staged: Vec<PackageIdentity> = state.staged.drain(..).collect();
        for identity in staged {
            if self.activation_dropout.contains(&identity) {
                debug!(package = %identity, "sim: staged package failed to activate");
                state.dormant.insert(identity);
                continue;
            }
            state.active.insert(identity);
        }
        let removals: Vec<String> = state.pending_removal.drain(..).collect();
        state.active.retain(|id| !removals.contains(&id.name));
        state.dormant.retain(|id| !removals.contains(&id.name));
        Ok(())
    }

    async fn abandon_install_sessions(&self) -> Result<(), SessionError> {
        self.record(DeviceCall::AbandonSessions);
        self.state.lock().staged.clear();
        Ok(())
    }
}

/// Inspector backed by a static file-to-identity map.
#[derive(Debug, Clone, Default)]
pub struct StaticInspector {
    catalog: HashMap<PathBuf, PackageIdentity>,
}

impl StaticInspector {
    /// An empty inspector; add entries with [`StaticInspector::with`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file as resolving to the given identity.
    pub fn with(mut self, file: impl Into<PathBuf>, identity: PackageIdentity) -> Self {
        self.catalog.insert(file.into(), identity);
        self
    }
}

impl PackageInspector for StaticInspector {
    fn resolve_identity(&self, file: &Path) -> Result<PackageIdentity, InspectError> {
        self.catalog
            .get(file)
            .cloned()
            .ok_or_else(|| InspectError::Unrecognized {
                file: file.to_path_buf(),
                reason: "no package metadata found".to_owned(),
            })
    }
}
