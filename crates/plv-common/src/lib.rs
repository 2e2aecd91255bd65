//! ---
//! plv_section: "01-core-functionality"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Shared primitives for the PLV harness."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
//! Shared primitives for the package lifecycle verification harness.
//! This crate exposes configuration loading and the tracing bootstrap
//! consumed across the workspace.

pub mod config;
pub mod logging;

pub use config::{DeviceConfig, HarnessConfig, LoadedHarnessConfig, LoggingConfig};
pub use logging::{init_tracing, LogFormat};
