// tests/identity_and_results.rs

use std::path::Path;

use scriptvisor::types::{script_dir, surface_path};
use scriptvisor::{ExecutionResult, ResolvedCommand, ScriptId, Stage};
use scriptvisor_test_utils::ScriptDir;

#[test]
fn dotted_and_plain_paths_share_an_identity() {
    let dir = ScriptDir::new();
    let script = dir.script("tool.py", "print('x')");
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let dotted = dir.path().join("sub").join("..").join(".").join("tool.py");
    assert_eq!(ScriptId::resolve(&script), ScriptId::resolve(&dotted));
}

#[cfg(unix)]
#[test]
fn symlink_resolves_to_its_target() {
    let dir = ScriptDir::new();
    let script = dir.script("target.py", "");
    let link = dir.symlink("target.py", "link.py");

    assert_eq!(ScriptId::resolve(&link), ScriptId::resolve(&script));
}

#[test]
fn missing_file_gets_a_lexically_normalized_identity() {
    let id = ScriptId::resolve("/definitely/not/../there/./script.py");
    assert_eq!(id.as_path(), Path::new("/definitely/there/script.py"));
    assert_eq!(id.to_string(), "/definitely/there/script.py");
}

#[cfg(unix)]
#[test]
fn surface_path_keeps_the_link_the_caller_named() {
    let dir = ScriptDir::new();
    dir.script("target.sh", "");
    let link = dir.symlink("target.sh", "link.sh");

    let surface = surface_path(&link);
    assert_eq!(surface, link);
    assert_eq!(script_dir(&surface), dir.path());
    assert_ne!(surface, ScriptId::resolve(&link).as_path());
}

#[test]
fn script_dir_of_a_root_level_path_is_root() {
    assert_eq!(script_dir(Path::new("/tool.py")), Path::new("/"));
    assert_eq!(script_dir(Path::new("/srv/jobs/tool.py")), Path::new("/srv/jobs"));
}

#[test]
fn stages_only_escalate_forward() {
    assert!(Stage::Running < Stage::Interrupted);
    assert!(Stage::Interrupted < Stage::Terminated);
    assert!(Stage::Terminated < Stage::Killed);

    assert_eq!(Stage::Running.next(), Some(Stage::Interrupted));
    assert_eq!(Stage::Terminated.next(), Some(Stage::Killed));
    assert_eq!(Stage::Killed.next(), None);
}

#[test]
fn interpreter_string_splits_program_and_args() {
    let cmd = ResolvedCommand::from_interpreter("/usr/bin/env   python3").unwrap();
    assert_eq!(cmd, ResolvedCommand::new("/usr/bin/env").arg("python3"));

    let plain = ResolvedCommand::from_interpreter("/usr/bin/python3").unwrap();
    assert!(plain.leading_args().is_empty());

    assert!(ResolvedCommand::from_interpreter("").is_err());
}

#[test]
fn summaries_follow_the_result_kind() {
    let ok = ExecutionResult::Success {
        output: "hello".into(),
    };
    assert_eq!(ok.summary(), "hello");
    assert_eq!(ok.exit_code(), Some(0));

    let quiet_failure = ExecutionResult::Failure {
        exit_code: 1,
        signal: None,
        stdout: String::new(),
        stderr: String::new(),
    };
    assert_eq!(quiet_failure.summary(), "script exited with status 1.");

    let killed = ExecutionResult::Failure {
        exit_code: 137,
        signal: Some(9),
        stdout: String::new(),
        stderr: "bye".into(),
    };
    assert_eq!(
        killed.summary(),
        "script was killed by signal 9 (status 137).\n\nerrors:\nbye"
    );

    let launch = ExecutionResult::LaunchError {
        reason: "No such file or directory (os error 2)".into(),
    };
    assert_eq!(launch.exit_code(), None);
    assert!(launch.summary().starts_with("could not start process"));
}
