use std::io::Write;
use std::process::{Command, Output, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_hydro-sim");

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to launch hydro-sim")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_prints_usage() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("USAGE"));
    assert!(text.contains("--time-scale"));
}

#[test]
fn unattended_run_reaches_running() {
    let output = run(&[
        "--autostart",
        "--no-console",
        "--json-logs",
        "--seed",
        "3",
        "--time-scale",
        "20",
        "--run-seconds",
        "2",
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Simulator initialized. Awaiting commands."));
    assert!(text.contains("Generator is now online and RUNNING."));
    assert!(text.contains("Run complete"));
}

#[test]
fn console_script_is_applied() {
    let mut child = Command::new(BIN)
        .args(["--json-logs"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch hydro-sim");

    {
        let stdin = child.stdin.as_mut().expect("stdin is piped");
        stdin
            .write_all(b"set waterHead 9000\nstart\nstatus\nlogs 2\nquit\n")
            .unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("STARTING at t="));
    assert!(text.contains("Verify all systems are ready"));
    assert!(text.contains("rejected console input"));
}

#[test]
fn missing_config_file_fails() {
    let output = run(&["--config", "/nonexistent/hydro-sim.json", "--no-console"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read simulation config"));
}

#[test]
fn config_file_and_log_dir_are_used() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(
        config,
        r#"{{"sequence_step_ms": 50, "tick_interval_ms": 100, "seed": 11}}"#
    )
    .unwrap();
    let log_dir = tempfile::tempdir().unwrap();

    let config_path = config.path().to_str().unwrap().to_string();
    let log_path = log_dir.path().to_str().unwrap().to_string();
    let output = run(&[
        "--config",
        &config_path,
        "--log-dir",
        &log_path,
        "--autostart",
        "--no-console",
        "--json-logs",
        "--run-seconds",
        "2",
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Generator is now online and RUNNING."));

    let files: Vec<_> = std::fs::read_dir(log_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(!files.is_empty());
    let written = std::fs::read_to_string(files[0].path()).unwrap();
    assert!(written.contains("Run complete"));
}
