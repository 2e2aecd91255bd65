//! ---
//! plv_section: "01-core-functionality"
//! plv_subsection: "module"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Configuration loading for the PLV harness."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_boot_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for a harness invocation.
///
/// The `package_files` option is mandatory: the harness refuses to run
/// without at least one package file to stage and sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Package files the harness operates on. The first entry is staged and
    /// activated; every entry is swept during reset.
    #[serde(default)]
    pub package_files: Vec<PathBuf>,
    /// Device session tuning.
    #[serde(default)]
    pub device: DeviceConfig,
    /// Logging sink configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`HarnessConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedHarnessConfig {
    pub config: HarnessConfig,
    pub source: PathBuf,
}

impl HarnessConfig {
    pub const ENV_CONFIG_PATH: &str = "PLV_CONFIG";

    /// Load configuration from disk, respecting the `PLV_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedHarnessConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedHarnessConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedHarnessConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<HarnessConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.package_files.is_empty() {
            return Err(anyhow!("configuration must name at least one package file"));
        }
        for file in &self.package_files {
            if file.as_os_str().is_empty() {
                return Err(anyhow!("package file names must not be empty"));
            }
        }
        if self.device.boot_timeout.is_zero() {
            return Err(anyhow!("device boot timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Device session tuning knobs.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Upper bound the session applies while waiting for boot completion.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_boot_timeout")]
    pub boot_timeout: Duration,
    /// Optional serial identifying the target when several are attached.
    #[serde(default)]
    pub serial: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            boot_timeout: default_boot_timeout(),
            serial: None,
        }
    }
}

/// Logging sink configuration shared across harness binaries and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory receiving rolling log files.
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    /// Optional prefix for log file names; defaults to the service name.
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Stdout log format.
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            file_prefix: None,
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp config file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn minimal_config_applies_defaults() {
        let file = write_config(r#"package_files = ["module-a.pkg"]"#);
        let loaded =
            HarnessConfig::load_with_source(&[file.path()]).expect("config loads");
        assert_eq!(loaded.source, file.path());
        let config = loaded.config;
        assert_eq!(config.package_files, vec![PathBuf::from("module-a.pkg")]);
        assert_eq!(config.device.boot_timeout, Duration::from_secs(120));
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
    }

    #[test]
    fn boot_timeout_parses_from_seconds() {
        let file = write_config(
            r#"
package_files = ["module-a.pkg"]

[device]
boot_timeout = 30
serial = "emulator-5554"
"#,
        );
        let config = HarnessConfig::load(&[file.path()]).expect("config loads");
        assert_eq!(config.device.boot_timeout, Duration::from_secs(30));
        assert_eq!(config.device.serial.as_deref(), Some("emulator-5554"));
    }

    #[test]
    fn missing_package_files_is_rejected() {
        let file = write_config("[device]\nboot_timeout = 30\n");
        let err = HarnessConfig::load(&[file.path()]).expect_err("must fail validation");
        assert!(err.to_string().contains("at least one package file"));
    }

    #[test]
    fn missing_candidates_report_inspected_paths() {
        let err = HarnessConfig::load(&["/definitely/not/here.toml"])
            .expect_err("no candidates exist");
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
