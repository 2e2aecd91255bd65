//! ---
//! plv_section: "03-lifecycle-verification"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Caller-supplied post-activation check hook."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::collections::HashSet;

use async_trait::async_trait;
use plv_device::PackageIdentity;

/// Caller-supplied verification hook, invoked after activation is confirmed
/// and strictly before teardown begins.
///
/// A failing check fails the run, but can never skip the post-run reset: the
/// harness observes the hook's outcome and tears down regardless. Implement
/// this for scenario-specific assertions, e.g. that a capability shipped by
/// the package actually became available.
#[async_trait]
pub trait ExtensionCheck: Send + Sync {
    /// Run the check against the active set observed after reboot.
    async fn verify(&self, active: &HashSet<PackageIdentity>) -> anyhow::Result<()>;
}

/// Default hook that checks nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCheck;

#[async_trait]
impl ExtensionCheck for NoopCheck {
    async fn verify(&self, _active: &HashSet<PackageIdentity>) -> anyhow::Result<()> {
        Ok(())
    }
}
