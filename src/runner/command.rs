//! Process-backed build runner

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::{BuildConfig, OutputMode};
use crate::error::{WatchRebuildError, WatchRebuildResult};

use super::{millis, BuildOutcome, BuildRunner};

/// How often a running child is polled for exit / cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long captured pipes may stay open after the child exits
const PIPE_GRACE: Duration = Duration::from_millis(250);

/// Lines of captured stderr attached to a failure notice
const STDERR_TAIL_LINES: usize = 20;

/// A validated build command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    line: String,
    shell: bool,
    output: OutputMode,
    cwd: Option<PathBuf>,
}

impl BuildCommand {
    /// Build from config, resolving `cwd` against the project root.
    pub fn from_config(config: &BuildConfig, project_root: &Path) -> WatchRebuildResult<Self> {
        let cwd = match &config.cwd {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_root.join(dir),
            None => project_root.to_path_buf(),
        };
        Self::new(&config.command, config.shell)
            .map(|cmd| cmd.with_output(config.output).with_cwd(cwd))
    }

    pub fn new(line: &str, shell: bool) -> WatchRebuildResult<Self> {
        if line.trim().is_empty() {
            return Err(WatchRebuildError::InvalidCommand {
                command: line.to_string(),
                reason: "command is empty".to_string(),
            });
        }
        Ok(Self {
            line: line.trim().to_string(),
            shell,
            output: OutputMode::Inherit,
            cwd: None,
        })
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    fn to_command(&self) -> Command {
        let mut cmd = if self.shell {
            shell_command(&self.line)
        } else {
            let mut parts = self.line.split_whitespace();
            // new() rejects blank lines, so there is always a program
            let program = parts.next().unwrap_or_default();
            let mut cmd = Command::new(program);
            cmd.args(parts);
            cmd
        };

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        match self.output {
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }
        cmd.stdin(Stdio::null());
        cmd
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Runs a [`BuildCommand`] as a child process.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: BuildCommand,
}

impl CommandRunner {
    pub fn new(command: BuildCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &BuildCommand {
        &self.command
    }

    fn failed(&self, detail: String, exit_code: Option<i32>, started: Instant) -> BuildOutcome {
        BuildOutcome::Failed {
            detail,
            exit_code,
            duration: started.elapsed(),
        }
    }
}

impl BuildRunner for CommandRunner {
    fn run(&self, running: &AtomicBool) -> BuildOutcome {
        let started = Instant::now();
        tracing::debug!(command = %self.command.line, "spawning build command");

        let mut child = match self.command.to_command().spawn() {
            Ok(child) => child,
            Err(e) => {
                return self.failed(
                    format!("failed to spawn '{}': {}", self.command.line, e),
                    None,
                    started,
                );
            }
        };

        let capture = Captured::attach(&mut child);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return self.failed(
                        format!("failed to wait for '{}': {}", self.command.line, e),
                        None,
                        started,
                    );
                }
            }

            if !running.load(Ordering::SeqCst) {
                tracing::debug!(pid = child.id(), "killing in-flight build");
                let _ = child.kill();
                let _ = child.wait();
                return BuildOutcome::Cancelled;
            }

            thread::sleep(POLL_INTERVAL);
        };

        let stderr = capture.finish(running);
        tracing::debug!(
            %status,
            elapsed_ms = millis(started.elapsed()),
            "build command exited"
        );

        if status.success() {
            BuildOutcome::Succeeded {
                duration: started.elapsed(),
            }
        } else {
            self.failed(
                failure_detail(&self.command.line, status, &stderr),
                status.code(),
                started,
            )
        }
    }

    fn describe(&self) -> String {
        self.command.line.clone()
    }
}

fn failure_detail(line: &str, status: ExitStatus, stderr: &str) -> String {
    let mut detail = format!("'{}' failed: {}", line, status);
    let tail = tail_lines(stderr, STDERR_TAIL_LINES);
    if !tail.is_empty() {
        detail.push('\n');
        detail.push_str(&tail);
    }
    detail
}

fn tail_lines(text: &str, max: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max);
    lines[start..].join("\n")
}

/// Reader threads draining captured pipes so the child never blocks on a full pipe.
///
/// Output lands in shared buffers, so whatever was read is available even
/// when a background process keeps a pipe open past the child's exit.
struct Captured {
    readers: Vec<JoinHandle<()>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    fn attach(child: &mut Child) -> Self {
        let stderr = Arc::new(Mutex::new(Vec::new()));
        let mut readers = Vec::new();
        if let Some(pipe) = child.stdout.take() {
            readers.push(thread::spawn(move || drain(pipe, None)));
        }
        if let Some(pipe) = child.stderr.take() {
            let sink = stderr.clone();
            readers.push(thread::spawn(move || drain(pipe, Some(sink))));
        }
        Self { readers, stderr }
    }

    /// Wait for the readers to hit EOF, at most `PIPE_GRACE` or until
    /// `running` is cleared. Readers still blocked are left detached.
    /// Returns captured stderr (empty when output is inherited).
    fn finish(self, running: &AtomicBool) -> String {
        let deadline = Instant::now() + PIPE_GRACE;
        while !self.readers.iter().all(|r| r.is_finished()) {
            if Instant::now() >= deadline || !running.load(Ordering::SeqCst) {
                tracing::debug!("build output pipes still open after exit, not waiting");
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }
        for reader in self.readers {
            if reader.is_finished() {
                let _ = reader.join();
            }
        }

        let bytes = match self.stderr.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn drain(mut pipe: impl Read, sink: Option<Arc<Mutex<Vec<u8>>>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if let Some(sink) = &sink {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    }
}
