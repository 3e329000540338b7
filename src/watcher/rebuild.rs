//! The rebuild loop
//!
//! `RebuildLoop` owns the watch options and a [`BuildRunner`]. It can run
//! on the caller's thread ([`RebuildLoop::run`]) or on its own thread
//! ([`RebuildLoop::spawn`]), which hands back a [`RebuildHandle`] with
//! `stop()`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{WatchRebuildError, WatchRebuildResult};
use crate::runner::{millis, BuildOutcome, BuildRunner};

use super::event::{classify, BuildTrigger, LoopState, WatchEvent, WatchOptions, WatcherState};
use super::filter::PathFilter;

/// Upper bound on how long the loop blocks waiting for an event
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type NotifyResult = Result<Event, notify::Error>;

/// Shared view of the loop phase
#[derive(Debug, Clone, Default)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub fn get(&self) -> LoopState {
        match self.0.load(Ordering::SeqCst) {
            0 => LoopState::Idle,
            _ => LoopState::Building,
        }
    }

    fn set(&self, state: LoopState) {
        let raw = match state {
            LoopState::Idle => 0,
            LoopState::Building => 1,
        };
        self.0.store(raw, Ordering::SeqCst);
    }
}

/// Watches a set of directories and re-runs a build on change.
pub struct RebuildLoop<R: BuildRunner> {
    options: WatchOptions,
    runner: R,
    state: StateCell,
}

impl<R: BuildRunner> RebuildLoop<R> {
    pub fn new(options: WatchOptions, runner: R) -> Self {
        Self {
            options,
            runner,
            state: StateCell::default(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Run the loop on the current thread until `running` is cleared.
    ///
    /// Order: run one startup build, validate the watch set, subscribe,
    /// drain the settle window, then rebuild on each debounced batch of
    /// changes. Build failures are reported through `on_event` and never
    /// end the loop; setup failures (e.g. a missing watch path) are
    /// returned after the startup build.
    pub fn run<F>(&self, running: Arc<AtomicBool>, on_event: F) -> WatchRebuildResult<()>
    where
        F: Fn(WatchEvent),
    {
        let roots = self.options.resolved_paths();

        on_event(WatchEvent::WatchStarted {
            watching: roots.iter().map(|p| p.display().to_string()).collect(),
            command: self.runner.describe(),
        });

        self.build(BuildTrigger::Startup, &running, &on_event);
        if !running.load(Ordering::SeqCst) {
            on_event(WatchEvent::Shutdown);
            return Ok(());
        }

        let filter = PathFilter::new(&roots, &self.options.ignore)?;

        let (tx, rx) = channel::<NotifyResult>();
        let mut watcher = RecommendedWatcher::new(
            move |res: NotifyResult| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| WatchRebuildError::watcher(PathBuf::new(), e))?;

        for root in filter.roots() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| WatchRebuildError::watcher(root, e))?;
            tracing::debug!(root = %root.display(), "subscribed");
        }

        // Some backends report pre-existing files right after subscribing
        let settle_end = Instant::now() + self.options.settle;
        while Instant::now() < settle_end && running.load(Ordering::SeqCst) {
            let _ = rx.recv_timeout(POLL_INTERVAL.min(self.options.settle));
        }
        on_event(WatchEvent::Subscribed);

        let result = self.event_loop(&rx, &filter, &running, &on_event);

        drop(watcher);
        on_event(WatchEvent::Shutdown);
        result
    }

    fn event_loop(
        &self,
        rx: &Receiver<NotifyResult>,
        filter: &PathFilter,
        running: &AtomicBool,
        on_event: &impl Fn(WatchEvent),
    ) -> WatchRebuildResult<()> {
        let mut pending = WatcherState::new(self.options.debounce);

        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    for (path, kind) in classify(&event.kind, &event.paths) {
                        if filter.accepts(&path) {
                            tracing::trace!(path = %path.display(), kind = kind.as_str(), "queued");
                            pending.add_change(path, kind);
                        }
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "watcher backend error");
                    on_event(WatchEvent::Error {
                        message: e.to_string(),
                    });
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if pending.should_build() {
                for (path, kind) in pending.take_changes() {
                    on_event(WatchEvent::FileChanged {
                        path: path.display().to_string(),
                        kind,
                    });
                }
                // Runs to completion here; anything arriving meanwhile waits
                // in the channel and becomes the next batch
                self.build(BuildTrigger::Change, running, on_event);
            }
        }

        Ok(())
    }

    fn build(&self, trigger: BuildTrigger, running: &AtomicBool, on_event: &impl Fn(WatchEvent)) {
        self.state.set(LoopState::Building);
        on_event(WatchEvent::BuildStarted { trigger });

        let outcome = self.runner.run(running);
        self.state.set(LoopState::Idle);

        match outcome {
            BuildOutcome::Succeeded { duration } => on_event(WatchEvent::BuildSucceeded {
                duration_ms: millis(duration),
            }),
            BuildOutcome::Failed {
                detail,
                exit_code,
                duration,
            } => {
                tracing::debug!(?exit_code, "build failed");
                on_event(WatchEvent::BuildFailed {
                    message: detail,
                    exit_code,
                    duration_ms: millis(duration),
                })
            }
            BuildOutcome::Cancelled => on_event(WatchEvent::BuildCancelled),
        }
    }
}

impl<R: BuildRunner + 'static> RebuildLoop<R> {
    /// Run the loop on a background thread.
    ///
    /// Setup errors (missing watch path, bad ignore pattern, subscription
    /// failure) surface from [`RebuildHandle::join`] once the startup build
    /// has run.
    pub fn spawn<F>(self, on_event: F) -> WatchRebuildResult<RebuildHandle>
    where
        F: Fn(WatchEvent) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let state = self.state.clone();
        let flag = running.clone();
        let thread = thread::Builder::new()
            .name("watch-rebuild".to_string())
            .spawn(move || self.run(flag, on_event))?;

        Ok(RebuildHandle {
            running,
            state,
            thread: Some(thread),
        })
    }
}

/// Handle to a loop started with [`RebuildLoop::spawn`].
///
/// Dropping the handle stops the loop.
pub struct RebuildHandle {
    running: Arc<AtomicBool>,
    state: StateCell,
    thread: Option<JoinHandle<WatchRebuildResult<()>>>,
}

impl RebuildHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Liveness flag shared with the loop, e.g. for a Ctrl+C handler
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Stop monitoring, kill an in-flight build and wait for the loop thread.
    pub fn stop(&mut self) -> WatchRebuildResult<()> {
        self.running.store(false, Ordering::SeqCst);
        self.join_inner()
    }

    /// Wait for the loop to end on its own (or via the running flag).
    pub fn join(mut self) -> WatchRebuildResult<()> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> WatchRebuildResult<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| WatchRebuildError::LoopPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for RebuildHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
