//! ---
//! plv_section: "15-testing-qa-runbook"
//! plv_subsection: "integration-tests"
//! plv_type: "source"
//! plv_scope: "code"
//! plv_description: "Configuration-driven harness construction tests."
//! plv_version: "v0.1.0"
//! plv_owner: "tbd"
//! ---
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use plv_common::HarnessConfig;
use plv_device::{PackageIdentity, SimDevice};
use plv_lifecycle::{NoopCheck, RunVerdict, VerificationHarness};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp config file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[tokio::test]
async fn config_driven_run_verifies_the_configured_package() {
    let config_file = write_config(
        r#"
package_files = ["com.example.media.pkg"]

[device]
boot_timeout = 90
"#,
    );
    let config = HarnessConfig::load(&[config_file.path()]).expect("config loads");
    assert_eq!(config.device.boot_timeout, Duration::from_secs(90));

    let device = SimDevice::new().provision(
        "com.example.media.pkg",
        PackageIdentity::new("com.example.media", 2),
    );
    let inspector = Arc::new(device.inspector());
    let harness = VerificationHarness::from_config(&config, Arc::new(device), inspector)
        .expect("harness builds from config");

    let verdict = harness.run(&NoopCheck).await.expect("run succeeds");
    assert!(matches!(verdict, RunVerdict::Verified(_)));
}

#[test]
fn later_candidates_are_used_when_earlier_ones_are_missing() {
    let config_file = write_config(r#"package_files = ["a.pkg", "b.pkg"]"#);
    let loaded = HarnessConfig::load_with_source(&[
        std::path::Path::new("/nonexistent/plv.toml"),
        config_file.path(),
    ])
    .expect("fallback candidate loads");
    assert_eq!(loaded.source, config_file.path());
    assert_eq!(loaded.config.package_files.len(), 2);
}

#[test]
fn tracing_bootstrap_creates_the_log_directory() {
    let dir = tempfile::tempdir().expect("temp log dir");
    let config = plv_common::LoggingConfig {
        directory: dir.path().join("logs"),
        file_prefix: Some("plv-tests".into()),
        format: plv_common::LogFormat::Pretty,
    };
    plv_common::init_tracing("plv-tests", &config).expect("tracing initialises");
    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn config_without_package_files_cannot_build_a_harness() {
    let config_file = write_config("[logging]\nformat = \"pretty\"\n");
    let err = HarnessConfig::load(&[config_file.path()]).expect_err("validation fails");
    assert!(err.to_string().contains("at least one package file"));
}
