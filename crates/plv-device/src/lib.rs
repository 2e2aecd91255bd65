//! ---
//! plv_section: "02-device-interface"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Device-facing interfaces for the PLV harness."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
//! Device-facing surface of the lifecycle verification harness.
//!
//! The harness core never talks to a transport directly; it drives one
//! target device through [`DeviceSession`] and resolves package identities
//! through [`PackageInspector`]. Production implementations wrap the real
//! device-control client; [`sim::SimDevice`] provides a scripted in-memory
//! stand-in for tests.

#![warn(missing_docs)]

pub mod identity;
pub mod inspect;
pub mod session;
pub mod sim;

pub use identity::{format_identity_set, PackageIdentity};
pub use inspect::{InspectError, PackageInspector};
pub use session::{
    DeviceSession, SessionError, StageVerdict, UninstallVerdict, BOOT_COMPLETE_TIMEOUT,
};
pub use sim::{DeviceCall, SimDevice, StaticInspector};
