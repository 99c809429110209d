// tests/options_loading.rs

use std::error::Error;
use std::fs;

use clap::Parser;
use tempfile::tempdir;

use mocha_supervisor::cli::CliArgs;
use mocha_supervisor::config::{load_and_validate, OptionValue};
use mocha_supervisor::errors::SupervisorError;
use mocha_supervisor::fs::RealFileSystem;
use mocha_supervisor::gate::{self, GateDecision};
use mocha_supervisor::launch::LaunchSpec;
use mocha_supervisor::resolve_options;
use mocha_supervisor_test_utils::RunOptionsBuilder;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn options_file_drives_the_launch() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("MochaSupervisor.toml");
    fs::write(
        &path,
        r#"
path = "./specs/**/*.spec.js"
fail-when-no-tests-run = 1
debugBrkMocha = "9230"
worker = ["node", "wrapper.js"]
_ = ["node", "chimp", "specs/login.spec.js"]

[mochaConfig]
reporter = "dot"
"#,
    )?;

    let opts = load_and_validate(&path)?;
    assert!(opts.fail_when_no_tests_run());
    assert_eq!(opts.debug_brk_mocha, Some(OptionValue::from("9230")));

    let spec = LaunchSpec::from_options(&opts)?;
    assert_eq!(
        spec.args(),
        vec!["--debug-brk=9230", "wrapper.js", "specs/login.spec.js"]
    );
    assert_eq!(spec.env_var("mochaConfig"), Some(r#"{"reporter":"dot"}"#));
    Ok(())
}

#[test]
fn malformed_options_file_is_a_toml_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "path = [")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(SupervisorError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn out_of_range_debug_port_is_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("opts.toml");
    fs::write(&path, "debugMocha = 70000\n")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(SupervisorError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn cli_flags_override_the_config_file() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("opts.toml");
    fs::write(&path, "path = \"./from-file\"\ndebugMocha = true\n")?;

    let args = CliArgs::try_parse_from([
        "mocha-supervisor",
        "--config",
        path.to_str().ok_or("non-utf8 temp path")?,
        "--path",
        "./from-cli",
        "--debug-mocha=false",
    ])?;
    let opts = resolve_options(&args)?;

    assert_eq!(opts.path, "./from-cli");
    assert!(LaunchSpec::from_options(&opts)?.exec_args.is_empty());
    Ok(())
}

#[test]
fn gate_matches_real_directory_tree() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().to_str().ok_or("non-utf8 temp path")?;
    fs::create_dir_all(dir.path().join("tests/unit"))?;
    fs::write(dir.path().join("tests/unit/math.spec.js"), "")?;

    let found = RunOptionsBuilder::new()
        .path(&format!("{root}/tests/**/*.spec.js"))
        .build();
    assert_eq!(gate::check(&RealFileSystem, &found)?, GateDecision::Proceed);

    let shallow = RunOptionsBuilder::new()
        .path(&format!("{root}/tests/*.spec.js"))
        .build();
    assert_eq!(gate::check(&RealFileSystem, &shallow)?, GateDecision::Skip);

    let strict = RunOptionsBuilder::new()
        .path(&format!("{root}/specs"))
        .strict(true)
        .build();
    match gate::check(&RealFileSystem, &strict) {
        Err(SupervisorError::NoSpecsFound { path }) => assert!(path.ends_with("/specs")),
        other => panic!("expected NoSpecsFound, got {other:?}"),
    }
    Ok(())
}
