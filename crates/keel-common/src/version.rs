//! ---
//! keel_section: "01-core-functionality"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Version metadata for CLI and API surfaces."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Build metadata reported by the CLI and the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// Semantic version taken from the workspace manifest.
    pub semver: String,
    /// Build profile (`debug` or `release`).
    pub profile: String,
}

impl VersionInfo {
    /// Version metadata for the running build.
    pub fn current() -> Self {
        let profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        };
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            profile: profile.to_owned(),
        }
    }

    /// Single-line form used in CLI banners and log lines.
    pub fn cli_string(&self) -> String {
        format!("keel {}", self.semver)
    }

    /// Multi-line form for `--version` output.
    pub fn extended(&self) -> String {
        format!("Keel {}\nprofile: {}", self.semver, self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_reports_manifest_version() {
        let version = VersionInfo::current();
        assert_eq!(version.semver, env!("CARGO_PKG_VERSION"));
        assert!(version.cli_string().starts_with("keel "));
        assert!(version.extended().contains(&version.profile));
    }
}
