//! Test helpers for behavioral specifications.
//!
//! Provides high-level DSL for testing tsuite CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

// Keep waits short so a hung job fails the spec quickly.
const TSUITE_CLONE_TIMEOUT_SECS: &str = "30";
const TSUITE_RUN_TIMEOUT_SECS: &str = "30";
const POLL_INTERVAL_MS: &str = "20";

/// Exit code for a job that finished in `failed`.
pub const EXIT_JOB_FAILED: i32 = 2;
/// Exit code when `--wait-timeout` elapsed first.
pub const EXIT_WAIT_TIMEOUT: i32 = 3;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR points at a different target directory.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns a Command configured to run the tsuite binary
pub fn tsuite_cmd() -> Command {
    Command::new(binary_path("tsuite"))
}

/// Create a CLI builder for tsuite commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                (
                    "TSUITE_CLONE_TIMEOUT_SECS".into(),
                    TSUITE_CLONE_TIMEOUT_SECS.into(),
                ),
                ("TSUITE_RUN_TIMEOUT_SECS".into(), TSUITE_RUN_TIMEOUT_SECS.into()),
                ("TSUITE_BOOTSTRAP_SCANNERS".into(), "false".into()),
            ],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = tsuite_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // A developer's own settings must not leak into specs.
        for key in [
            "TSUITE_CONFIG",
            "TSUITE_MAX_CONCURRENT",
            "TSUITE_WORKSPACE_DIR",
            "TSUITE_INSTALL_TIMEOUT_SECS",
            "TSUITE_SCAN_TIMEOUT_SECS",
            "TSUITE_OUTPUT_LIMIT_BYTES",
            "TSUITE_RETENTION_SECS",
            "TSUITE_LOG_PATH",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    fn output(self) -> Output {
        let mut cmd = self.command();
        cmd.stdin(Stdio::null());
        cmd.output().expect("command should run")
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let output = self.output();
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let output = self.output();
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect a specific exit code
    pub fn exits(self, code: i32) -> RunAssert {
        let output = self.output();
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit code\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    /// **Prefer this for format specs** - catches format regressions.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout contains substring.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stdout does not contain substring.
    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }

    /// Parse each stdout line as a JSON document.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout()
            .lines()
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|e| panic!("not JSON ({e}): {line}"))
            })
            .collect()
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    condition()
}

/// True while `pid` exists and is not a zombie.
pub fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        // No procfs: ask the kernel directly.
        Err(_) if !Path::new("/proc/self").exists() => Command::new("kill")
            .args(["-0", &pid.to_string()])
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success()),
        Err(_) => false,
    }
}

// =============================================================================
// Fixture repository
// =============================================================================

/// A local git repository on branch `main` plus an isolated workspace root.
pub struct Fixture {
    repo: tempfile::TempDir,
    workspaces: tempfile::TempDir,
    config_home: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            repo: tempfile::tempdir().unwrap(),
            workspaces: tempfile::tempdir().unwrap(),
            config_home: tempfile::tempdir().unwrap(),
        };
        fixture.git(&["init", "--quiet"]);
        fixture.git(&["checkout", "--quiet", "-b", "main"]);
        fixture
    }

    /// Write a file in the repository (parent directories created automatically)
    pub fn file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let full_path = self.repo.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
        self
    }

    /// Commit everything written so far.
    pub fn commit(self) -> Self {
        self.git(&["add", "--all"]);
        self.git(&[
            "-c",
            "user.name=spec",
            "-c",
            "user.email=spec@example.com",
            "commit",
            "--quiet",
            "--allow-empty",
            "-m",
            "fixture",
        ]);
        self
    }

    /// `file://` URL so shallow clones work.
    pub fn url(&self) -> String {
        format!("file://{}", self.repo.path().display())
    }

    pub fn workspace_root(&self) -> &Path {
        self.workspaces.path()
    }

    /// Entries left behind in the workspace root.
    pub fn leftover_workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.workspace_root())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// tsuite with the workspace root and config home pointed into this fixture.
    pub fn tsuite(&self) -> CliBuilder {
        cli()
            .pwd(self.repo.path())
            .env("TSUITE_WORKSPACE_DIR", self.workspace_root())
            .env("XDG_CONFIG_HOME", self.config_home.path())
    }

    /// `tsuite run` for `kind`/`subtype` against this repository.
    pub fn run(&self, id: &str, kind: &str, subtype: &str) -> CliBuilder {
        let url = self.url();
        self.tsuite().args(&[
            "run",
            "--id",
            id,
            "--kind",
            kind,
            "--subtype",
            subtype,
            "--repo",
            &url,
            "--poll-interval-ms",
            POLL_INTERVAL_MS,
        ])
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.repo.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .expect("git should run");
        assert!(status.success(), "git {args:?} failed");
    }
}

/// Shell script printing a jest `--json` summary and exiting with `code`.
pub fn jest_script(passed: u32, failed: u32, code: i32) -> String {
    format!(
        "cat <<'EOF'\n\
         {{\"numTotalTests\":{total},\"numPassedTests\":{passed},\"numFailedTests\":{failed},\
         \"numPendingTests\":0,\"success\":{success},\"testResults\":[]}}\n\
         EOF\n\
         exit {code}\n",
        total = passed + failed,
        success = failed == 0,
    )
}
