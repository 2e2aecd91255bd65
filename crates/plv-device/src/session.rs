//! ---
//! plv_section: "02-device-interface"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Device session trait and transport error taxonomy."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::PackageIdentity;

/// Default ceiling a session applies while waiting for boot completion.
///
/// Owned by the session implementation, not by callers: [`DeviceSession::reboot`]
/// returns only once the device is reachable again or this budget is spent.
pub const BOOT_COMPLETE_TIMEOUT: Duration = Duration::from_secs(120);

/// Transport-level failures talking to the device.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The device-control channel failed or the device dropped off the bus.
    #[error("device transport failure: {0}")]
    Transport(String),
    /// The device did not report boot completion within the session budget.
    #[error("device did not complete boot within {timeout:?}")]
    BootTimeout {
        /// The budget that was exhausted.
        timeout: Duration,
    },
}

/// Outcome of a staged install request.
///
/// The device reports rejection through the same channel as success, so the
/// verdict is explicit rather than a nullable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageVerdict {
    /// The package was accepted into the staging area.
    Accepted,
    /// The device refused the package (bad signature, version downgrade, ...).
    /// Install refusals are deterministic configuration problems; retrying
    /// does not help.
    Rejected(String),
}

/// Outcome of an uninstall-by-name request.
///
/// Split three ways on purpose: "nothing was installed under that name" is a
/// benign no-op for reset purposes and must not be confused with a real
/// uninstall failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallVerdict {
    /// A package was removed; the removal takes effect on the next reboot.
    Removed,
    /// No package by that name was installed. Nothing to do.
    NotInstalled,
    /// The device refused to uninstall for a real reason.
    Failed(String),
}

/// One controlled target device.
///
/// Every call may block for seconds to minutes; the device is slow, stateful,
/// and its installed-package state outlives the calling process. All calls are
/// issued strictly sequentially by the harness.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Whether the device supports this class of package update at all.
    /// A `false` here gates the whole verification run as inapplicable.
    async fn update_supported(&self) -> Result<bool, SessionError>;

    /// Submit a package file for staged install. The package does not take
    /// effect until the next reboot.
    async fn install_staged(&self, file: &Path) -> Result<StageVerdict, SessionError>;

    /// Query the set of currently active package identities. Recomputed on
    /// every call; never cached across reboots.
    async fn active_identities(&self) -> Result<HashSet<PackageIdentity>, SessionError>;

    /// Request uninstall of the named package. Like staging, removal takes
    /// effect on the next reboot.
    async fn uninstall(&self, name: &str) -> Result<UninstallVerdict, SessionError>;

    /// Trigger a full reboot and block until the device is reachable again.
    /// Boot-completion waiting is bounded by the session's own timeout policy
    /// (see [`BOOT_COMPLETE_TIMEOUT`]).
    async fn reboot(&self) -> Result<(), SessionError>;

    /// Abandon any stray staged-install sessions left on the device. Invoked
    /// as part of guaranteed cleanup so an aborted run cannot wedge the next.
    async fn abandon_install_sessions(&self) -> Result<(), SessionError>;
}
