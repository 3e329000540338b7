//! Test environment for isolated watch-rebuild runs.
//!
//! Provides `TestEnv` - a temp project directory plus an isolated config
//! home - and `WatchProcess`, a running watcher whose stdout/stderr are
//! collected line by line.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use super::fixtures::{BUTTON_COMPONENT, INDEX_PAGE};

/// Result of a watch-rebuild run that exits on its own
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Temporary directory for the project
    pub project_root: TempDir,
    /// Temporary directory used as XDG_CONFIG_HOME
    pub config_home: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    /// Project with the jay-app layout: `src/components`, `src/pages`, `dist`
    pub fn new() -> Self {
        let env = Self::empty();
        env.write_project_file("src/components/button.ts", BUTTON_COMPONENT);
        env.write_project_file("src/pages/index.ts", INDEX_PAGE);
        env.create_subdirectories(&["dist"]);
        env
    }

    /// Project directory with nothing in it
    pub fn empty() -> Self {
        Self {
            project_root: TempDir::new().expect("Failed to create project dir"),
            config_home: TempDir::new().expect("Failed to create config home"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_watch-rebuild")),
        }
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Remove a project file
    pub fn remove_project_file(&self, relative_path: &str) {
        std::fs::remove_file(self.project_path(relative_path)).expect("Failed to remove file");
    }

    /// Create subdirectories in the project
    pub fn create_subdirectories(&self, dirs: &[&str]) {
        for dir in dirs {
            std::fs::create_dir_all(self.project_path(dir))
                .expect("Failed to create subdirectory");
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("WATCH_REBUILD_PATHS")
            .env_remove("WATCH_REBUILD_COMMAND")
            .env_remove("WATCH_REBUILD_DEBOUNCE_MS")
            .env_remove("WATCH_REBUILD_COLOR");
        cmd
    }

    /// Run to completion (for invocations expected to exit, e.g. errors or --help)
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output: Output = self
            .command(args)
            .output()
            .expect("Failed to execute watch-rebuild");
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Start a long-running watcher
    pub fn spawn_watch(&self, args: &[&str]) -> WatchProcess {
        let mut child = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to start watch-rebuild");

        let stdout = collect_lines(child.stdout.take().expect("stdout piped"));
        let stderr = collect_lines(child.stderr.take().expect("stderr piped"));

        WatchProcess {
            child,
            stdout,
            stderr,
        }
    }
}

type Lines = Arc<Mutex<Vec<String>>>;

fn collect_lines(pipe: impl Read + Send + 'static) -> Lines {
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    thread::spawn(move || {
        for line in BufReader::new(pipe).lines().map_while(Result::ok) {
            sink.lock().unwrap().push(line);
        }
    });
    lines
}

/// A running watcher. Killed on drop.
pub struct WatchProcess {
    child: Child,
    stdout: Lines,
    stderr: Lines,
}

impl WatchProcess {
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lock().unwrap().clone()
    }

    pub fn stderr_lines(&self) -> Vec<String> {
        self.stderr.lock().unwrap().clone()
    }

    /// Number of stdout lines containing `needle`
    pub fn count_stdout(&self, needle: &str) -> usize {
        self.stdout
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.contains(needle))
            .count()
    }

    pub fn count_stderr(&self, needle: &str) -> usize {
        self.stderr
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.contains(needle))
            .count()
    }

    /// Wait until `needle` appears at least `n` times on stdout
    pub fn wait_for_stdout(&self, needle: &str, n: usize, timeout: Duration) -> bool {
        wait_until(timeout, || self.count_stdout(needle) >= n)
    }

    pub fn wait_for_stderr(&self, needle: &str, n: usize, timeout: Duration) -> bool {
        wait_until(timeout, || self.count_stderr(needle) >= n)
    }

    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for WatchProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let end = Instant::now() + timeout;
    while Instant::now() < end {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    cond()
}

