//! Acceptance test: runs the application as a subprocess and asserts its
//! output for given argument combinations matches what is expected.

use std::net::SocketAddr;

use crate::_impl::AssertCmdExt;
use anyhow::Result;
use assert_cmd::Command;
use pretty_assertions::assert_eq;
use predicates::prelude::{predicate, PredicateBooleanExt};
use rstest::{fixture, rstest};
use upload_server::{config::UploadServerConfig, naming::NameStrategy};

#[fixture]
fn setup() -> Result<Command> {
    let runner = Command::cargo_bin(env!("CARGO_PKG_NAME").replace('_', "-"))?;

    Ok(runner)
}

#[rstest]
fn test_version_no_args_passes(setup: Result<Command>) -> Result<()> {
    let assert = setup?.arg("--version").assert();

    assert
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")))
        .success();

    Ok(())
}

#[rstest]
fn test_help_lists_subcommands_passes(setup: Result<Command>) -> Result<()> {
    let assert = setup?.arg("--help").assert();

    assert
        .stdout(predicate::str::contains("serve").and(predicate::str::contains("config")))
        .success();

    Ok(())
}

/// Use command-line argument values
#[rstest]
fn test_serve_with_args_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("uploads");

    let assert = setup?
        .arg("serve")
        .args(["--listen", "127.0.0.1:0"])
        .args(["--output", &output.display().to_string()])
        .args(["--secret", "s3cret"])
        .args(["--naming", "md5"])
        .test_mode_args()
        .assert();

    assert
        .stdout(predicates::str::contains("Upload secret is enabled."))
        .stdout(predicates::str::contains("Naming uploads with the `md5` strategy."))
        .stdout(predicates::str::contains("Listening on: `http://127.0.0.1:"))
        .stdout(predicates::str::contains("Shutting down gracefully ..."))
        .success();

    assert!(output.is_dir());

    Ok(())
}

/// Use configured values, overriding some of them on the command line
#[rstest]
fn test_serve_with_config_and_args_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;

    let mut config = UploadServerConfig::default();
    config.server.listen = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
    config.server.public_path = Some("/files/".to_string());
    config.storage.output_dir = Some(dir.path().join("from-config"));

    let assert = setup?
        .test_mode_args()
        .config(&dir, &config)
        .arg("serve")
        .args(["--public-path", "/dl/"])
        .assert();

    assert
        .stdout(predicates::str::contains("Using configuration file:"))
        .stdout(predicates::str::contains("No upload secret configured."))
        .stdout(predicates::str::contains("Serving uploads under `/dl/`."))
        .stdout(predicates::str::contains("Shutting down gracefully ..."))
        .success();

    assert!(dir.path().join("from-config").is_dir());

    Ok(())
}

#[rstest]
fn test_serve_with_zero_max_size_fails(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;

    let assert = setup?
        .arg("serve")
        .args(["--listen", "127.0.0.1:0"])
        .args(["--output", &dir.path().display().to_string()])
        .args(["--max-size", "0"])
        .test_mode_args()
        .assert();

    assert
        .stderr(predicates::str::contains(
            "The maximum upload size must be at least 1 MB.",
        ))
        .failure()
        .code(1);

    Ok(())
}

#[rstest]
fn test_serve_with_missing_not_found_page_fails(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let page = dir.path().join("missing.html");

    setup?
        .arg("serve")
        .args(["--listen", "127.0.0.1:0"])
        .args(["--output", &dir.path().display().to_string()])
        .args(["--not-found-page", &page.display().to_string()])
        .test_mode_args()
        .assert()
        .failure()
        .code(1);

    Ok(())
}

#[rstest]
fn test_config_into_missing_directory_fails(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("no").join("such").join("dir.toml");

    setup?.arg("config").arg(&path).assert().failure().code(1);

    assert!(!path.exists());

    Ok(())
}

#[rstest]
fn test_config_writes_effective_configuration_passes(setup: Result<Command>) -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("generated.toml");

    setup?
        .arg("config")
        .arg(&path)
        .args(["--listen", "127.0.0.1:9000"])
        .args(["--naming", "random"])
        .args(["--iplist", "10.0.0.1,::1"])
        .assert()
        .success();

    let config = UploadServerConfig::from_file(&path)?;
    assert_eq!(config.server.listen, Some("127.0.0.1:9000".parse()?));
    assert_eq!(config.server.public_path.as_deref(), Some("/!/"));
    assert_eq!(config.storage.max_size, Some(10));
    assert_eq!(config.storage.naming, Some(NameStrategy::Random));
    assert_eq!(
        config.access.iplist,
        Some(vec!["10.0.0.1".parse()?, "::1".parse()?])
    );
    assert_eq!(config.auth.secret, None);

    Ok(())
}
