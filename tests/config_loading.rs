// tests/config_loading.rs

use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use scriptvisor::config::{load_and_validate, load_or_default, parse_duration, ConfigFile};
use scriptvisor::errors::SupervisorError;
use scriptvisor::{ResolvedCommand, Supervisor, SupervisorOptions};
use scriptvisor_test_utils::builders::ConfigFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_parsed_into_typed_settings() {
    let file = write_config(
        r#"
[supervisor]
escalation_unit = "250ms"
event_capacity = 8

[interpreter]
command = "/usr/bin/env python3"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.supervisor.escalation_unit, Duration::from_millis(250));
    assert_eq!(cfg.supervisor.event_capacity, 8);
    assert_eq!(
        cfg.interpreter,
        Some(ResolvedCommand::new("/usr/bin/env").arg("python3"))
    );

    let options = SupervisorOptions::from(&cfg);
    assert_eq!(options.escalation.unit, Duration::from_millis(250));
    assert_eq!(options.event_capacity, 8);

    let supervisor = Supervisor::new(options);
    assert_eq!(
        supervisor.escalation_policy().unit,
        Duration::from_millis(250)
    );
}

#[test]
fn empty_config_uses_defaults() {
    let file = write_config("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.supervisor.escalation_unit, Duration::from_secs(1));
    assert_eq!(cfg.supervisor.event_capacity, 64);
    assert!(cfg.interpreter.is_none());
}

#[test]
fn explicit_missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_or_default(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, SupervisorError::IoError(_)));
}

#[test]
fn invalid_escalation_unit_is_rejected() {
    let file = write_config(
        r#"
[supervisor]
escalation_unit = "soon"
"#,
    );

    match load_and_validate(file.path()) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("escalation_unit")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_escalation_unit_and_capacity_are_rejected() {
    let raw = ConfigFileBuilder::new().escalation_unit("0s").raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SupervisorError::ConfigError(_))
    ));

    let raw = ConfigFileBuilder::new().event_capacity(0).raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SupervisorError::ConfigError(_))
    ));
}

#[test]
fn blank_interpreter_is_rejected() {
    let raw = ConfigFileBuilder::new().interpreter("   ").raw();
    match ConfigFile::try_from(raw) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("[interpreter]")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[supervisor\nescalation_unit = ");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SupervisorError::TomlError(_))
    ));
}

#[test]
fn builder_produces_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .escalation_unit("2s")
        .interpreter("/opt/homebrew/bin/python3 -u")
        .build();

    assert_eq!(cfg.supervisor.escalation_unit, Duration::from_secs(2));
    let interpreter = cfg.interpreter.unwrap();
    assert_eq!(interpreter.program(), "/opt/homebrew/bin/python3");
    assert_eq!(interpreter.leading_args(), &[OsString::from("-u")]);
    assert_eq!(interpreter.to_string(), "/opt/homebrew/bin/python3 -u");
}

#[test]
fn durations_accept_the_supported_suffixes() {
    assert_eq!(parse_duration("150ms"), Ok(Duration::from_millis(150)));
    assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));

    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5d").is_err());
}

#[test]
fn huge_durations_are_rejected_instead_of_overflowing() {
    assert_eq!(
        parse_duration("6000000000000000h"),
        Err("duration out of range".to_string())
    );
    assert_eq!(
        parse_duration("18446744073709551615m"),
        Err("duration out of range".to_string())
    );
    assert_eq!(
        parse_duration("18446744073709551615s"),
        Ok(Duration::from_secs(u64::MAX))
    );

    let raw = ConfigFileBuilder::new().escalation_unit("6000000000000000h").raw();
    match ConfigFile::try_from(raw) {
        Err(SupervisorError::ConfigError(msg)) => assert!(msg.contains("out of range")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
