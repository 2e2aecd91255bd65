//! ---
//! plv_section: "02-device-interface"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Package identity records and diagnostics helpers."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of an installable package.
///
/// Resolved once from a package file and never mutated afterwards. Identity
/// equality is over both fields: the same module name at a different version
/// is a different identity, which is what activation checks rely on after a
/// version bump.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Module name, unique per device.
    pub name: String,
    /// Monotonic version code.
    pub version: i64,
}

impl PackageIdentity {
    /// Construct an identity from its parts.
    pub fn new(name: impl Into<String>, version: i64) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Render an active set for failure diagnostics, sorted for stable output.
pub fn format_identity_set(set: &HashSet<PackageIdentity>) -> String {
    let mut entries: Vec<String> = set.iter().map(ToString::to_string).collect();
    entries.sort();
    entries.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_equality_covers_both_fields() {
        let a = PackageIdentity::new("com.example.media", 1);
        let same = PackageIdentity::new("com.example.media", 1);
        let newer = PackageIdentity::new("com.example.media", 2);
        let other = PackageIdentity::new("com.example.net", 1);
        assert_eq!(a, same);
        assert_ne!(a, newer);
        assert_ne!(a, other);
    }

    #[test]
    fn format_is_sorted_and_stable() {
        let set: HashSet<PackageIdentity> = [
            PackageIdentity::new("zeta", 3),
            PackageIdentity::new("alpha", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(format_identity_set(&set), "alpha@1, zeta@3");
    }
}
