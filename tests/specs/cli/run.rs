//! `tsuite run` specs
//!
//! Each run clones the fixture repository and replaces the tool command
//! with a shell script so no node or python toolchain is needed.

use crate::prelude::*;

#[test]
fn passing_suite_completes() {
    let fixture = Fixture::new().file("run.sh", &jest_script(3, 0, 0)).commit();

    fixture
        .run("r1", "test", "jest")
        .args(&["--command", "sh run.sh"])
        .passes()
        .stdout_has("r1 queued: jest test queued successfully\n")
        .stdout_has("r1 completed\n")
        .stdout_has("test jest r1: completed in ")
        .stdout_has("tests: 3 total, 3 passed, 0 failed, 0 skipped (exit code 0)\n");
    assert!(fixture.leftover_workspaces().is_empty());
}

#[test]
fn failing_suite_exits_with_job_failed() {
    let fixture = Fixture::new().file("run.sh", &jest_script(1, 2, 1)).commit();

    fixture
        .run("r2", "test", "jest")
        .args(&["--command", "sh run.sh"])
        .exits(EXIT_JOB_FAILED)
        .stdout_has("r2 failed\n")
        .stdout_has("tests: 3 total, 1 passed, 2 failed, 0 skipped (exit code 1)\n");
    assert!(fixture.leftover_workspaces().is_empty());
}

#[test]
fn env_overlay_reaches_the_run_step() {
    let script = "if [ \"$SUITE_MODE\" = strict ] && [ \"$CI\" = true ]; then exit 0; fi\nexit 1\n";
    let fixture = Fixture::new().file("run.sh", script).commit();

    fixture
        .run("r3", "test", "jest")
        .args(&["--command", "sh run.sh", "--env", "SUITE_MODE=strict"])
        .passes()
        .stdout_has("(exit code 0)");
}

#[test]
fn run_timeout_fails_and_removes_the_workspace() {
    let fixture = Fixture::new().file("run.sh", "exec sleep 30\n").commit();

    fixture
        .run("r4", "test", "jest")
        .args(&["--command", "sh run.sh"])
        .env("TSUITE_RUN_TIMEOUT_SECS", "1")
        .exits(EXIT_JOB_FAILED)
        .stdout_has("timed out");
    assert!(fixture.leftover_workspaces().is_empty());
}

#[test]
fn wait_timeout_cancels_the_job_and_its_processes() {
    let fixture = Fixture::new()
        .file("run.sh", "sleep 30 &\necho $! > \"$PID_FILE\"\nwait\n")
        .commit();
    let scratch = tempfile::tempdir().unwrap();
    let pid_file = scratch.path().join("tool.pid");

    fixture
        .run("r6", "test", "jest")
        .args(&["--command", "sh run.sh", "--wait-timeout", "3"])
        .args(&["--env", &format!("PID_FILE={}", pid_file.display())])
        .exits(EXIT_WAIT_TIMEOUT)
        .stderr_has("timed out waiting for test/r6");

    assert!(fixture.leftover_workspaces().is_empty());
    let pid: u32 = std::fs::read_to_string(&pid_file)
        .expect("tool should have started before the wait timeout")
        .trim()
        .parse()
        .unwrap();
    assert!(
        wait_for(2000, || !process_alive(pid)),
        "tool process {pid} outlived the CLI"
    );
}

#[test]
fn json_output_streams_one_document_per_line() {
    let fixture = Fixture::new().file("run.sh", &jest_script(2, 0, 0)).commit();

    let run = fixture
        .run("r5", "test", "jest")
        .args(&["--command", "sh run.sh", "-o", "json"])
        .passes();
    let docs = run.json_lines();

    let ack = docs.first().unwrap();
    assert_eq!(ack["id"], "r5");
    assert_eq!(ack["status"], "queued");

    let results = docs.last().unwrap();
    assert_eq!(results["status"], "completed");
    assert_eq!(results["report"]["total"], 2);
    assert_eq!(results["report"]["success"], true);
}

#[test]
fn scan_without_manifests_completes_empty() {
    let fixture = Fixture::new().file("README", "nothing to scan\n").commit();

    fixture
        .run("s1", "security-scan", "dependency")
        .passes()
        .stdout_has("security-scan dependency s1: completed")
        .stdout_has("findings: 0 total");
}
