//! ---
//! plv_section: "02-device-interface"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Package inspection interface."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::identity::PackageIdentity;

/// Failures resolving a package file into an identity.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The file exists but does not carry recognizable package metadata.
    #[error("{} is not a recognizable package: {reason}", .file.display())]
    Unrecognized {
        /// Offending file.
        file: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },
    /// The file could not be read at all.
    #[error("unable to read package {}", .file.display())]
    Io {
        /// Offending file.
        file: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a package file into its stable on-device identity.
///
/// Parsing package internals is delegated to the implementation; the harness
/// only needs the (name, version) pair to recognize the package in the active
/// set and to target uninstall.
pub trait PackageInspector: Send + Sync {
    /// Resolve the identity carried by `file`.
    fn resolve_identity(&self, file: &Path) -> Result<PackageIdentity, InspectError>;
}
