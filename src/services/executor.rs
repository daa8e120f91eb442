//! Deploy script executor.
//!
//! Pulls admitted events off per-project FIFO queues and runs each project's
//! deploy script as a subprocess, streaming captured output into the event
//! record. Events for the same project execute strictly one at a time; events
//! for different projects run in parallel up to a global concurrency bound.
//!
//! Every event handed to the executor reaches a terminal status
//! (success, failed, timedout) no matter how the subprocess behaves.

use std::collections::{HashMap, HashSet, VecDeque};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::entity::deploy_project;
use crate::error::{AppError, AppResult};
use crate::models::{EventStatus, WsEvent, WsEventMessage};
use crate::services::EventBroadcaster;

/// Marker appended once when a stream crosses the output cap.
const TRUNCATION_MARKER: &str = "[output truncated]";

/// Executor tuning, derived from application config.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Global cap on concurrently running deploy scripts.
    pub max_concurrent: usize,
    /// Per-stream captured output cap in bytes.
    pub max_output_bytes: usize,
    /// How often captured output is flushed to the store during a run.
    pub flush_interval: Duration,
}

impl ExecutorConfig {
    pub fn from_config(config: &Config) -> Self {
        ExecutorConfig {
            max_concurrent: config.max_concurrent_deploys,
            max_output_bytes: config.max_output_bytes,
            flush_interval: Duration::from_millis(config.output_flush_ms),
        }
    }
}

/// Everything needed to launch one deploy script.
#[derive(Debug, Clone)]
pub struct ScriptSpec {
    /// Command line, run via /bin/sh -c.
    pub script: String,
    /// Wall-clock limit in seconds; 0 disables the timeout.
    pub timeout_secs: u64,
    pub branch: String,
    pub commit: Option<String>,
    pub site: Option<String>,
    pub site_config_path: Option<String>,
}

impl ScriptSpec {
    /// Build a spec from the project's configuration and the event's
    /// trigger-time branch and commit.
    pub fn from_project(
        project: &deploy_project::Model,
        branch: &str,
        commit: Option<&str>,
    ) -> Self {
        ScriptSpec {
            script: project.script.clone(),
            timeout_secs: project.script_timeout.unwrap_or(0).max(0) as u64,
            branch: branch.to_string(),
            commit: commit.map(String::from),
            site: project.site.clone(),
            site_config_path: project.site_config_path.clone(),
        }
    }
}

/// One captured line of subprocess output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// How a script run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Process exited with a code.
    Exited(i32),
    /// Process was killed by a signal other than ours.
    Signaled,
    /// Killed after exceeding the configured timeout (seconds).
    TimedOut(u64),
    /// Killed by an operator cancel.
    Cancelled,
    /// The subprocess never started.
    SpawnFailed(String),
}

/// Run one deploy script to completion, streaming output lines into `output`.
///
/// The timeout deadline is monotonic (tokio time), independent of wall-clock
/// adjustments. On timeout or cancel the child is SIGKILLed and reaped before
/// returning, so the subprocess is guaranteed dead once this resolves.
pub async fn run_script(
    spec: ScriptSpec,
    cancel: oneshot::Receiver<()>,
    output: mpsc::UnboundedSender<OutputLine>,
) -> Termination {
    let mut command = Command::new("/bin/sh");
    command
        .arg("-c")
        .arg(&spec.script)
        .env("DEPLOY_BRANCH", &spec.branch)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(ref commit) = spec.commit {
        command.env("DEPLOY_COMMIT", commit);
    }
    if let Some(ref site) = spec.site {
        command.env("DEPLOY_SITE", site);
    }
    if let Some(ref path) = spec.site_config_path {
        command.env("DEPLOY_SITE_CONFIG_PATH", path);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return Termination::SpawnFailed(format!("failed to spawn shell: {}", e)),
    };

    // Stdio::piped above guarantees both handles exist
    let Some(stdout) = child.stdout.take() else {
        let _ = child.start_kill();
        return Termination::SpawnFailed("stdout pipe missing".to_string());
    };
    let Some(stderr) = child.stderr.take() else {
        let _ = child.start_kill();
        return Termination::SpawnFailed("stderr pipe missing".to_string());
    };

    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();
    let mut stdout_done = false;
    let mut stderr_done = false;

    let deadline = match spec.timeout_secs {
        0 => None,
        secs => Some(tokio::time::Instant::now() + Duration::from_secs(secs)),
    };
    let timeout = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(timeout);

    // Resolves only on a real cancel signal; a dropped sender pends forever
    let cancelled = async {
        if cancel.await.is_err() {
            std::future::pending::<()>().await
        }
    };
    tokio::pin!(cancelled);

    // Stream output until both pipes close or the run is interrupted
    let mut interrupted: Option<Termination> = None;
    while interrupted.is_none() && !(stdout_done && stderr_done) {
        tokio::select! {
            line = stdout_lines.next_line(), if !stdout_done => match line {
                Ok(Some(line)) => {
                    let _ = output.send(OutputLine::Stdout(line));
                }
                Ok(None) => stdout_done = true,
                Err(e) => {
                    let _ = output.send(OutputLine::Stderr(format!("[stdout read error: {}]", e)));
                    stdout_done = true;
                }
            },
            line = stderr_lines.next_line(), if !stderr_done => match line {
                Ok(Some(line)) => {
                    let _ = output.send(OutputLine::Stderr(line));
                }
                Ok(None) => stderr_done = true,
                Err(e) => {
                    let _ = output.send(OutputLine::Stderr(format!("[stderr read error: {}]", e)));
                    stderr_done = true;
                }
            },
            _ = &mut cancelled => interrupted = Some(Termination::Cancelled),
            _ = &mut timeout => interrupted = Some(Termination::TimedOut(spec.timeout_secs)),
        }
    }

    // Closed pipes do not imply exit; the final wait still honors the
    // deadline and cancel signal
    if interrupted.is_none() {
        tokio::select! {
            status = child.wait() => {
                return match status {
                    Ok(st) => match st.code() {
                        Some(code) => Termination::Exited(code),
                        None => Termination::Signaled,
                    },
                    Err(e) => Termination::SpawnFailed(format!("wait failed: {}", e)),
                };
            },
            _ = &mut cancelled => interrupted = Some(Termination::Cancelled),
            _ = &mut timeout => interrupted = Some(Termination::TimedOut(spec.timeout_secs)),
        }
    }

    // Interrupted: kill and reap before reporting
    let _ = child.start_kill();
    let _ = child.wait().await;
    match interrupted {
        Some(termination) => termination,
        // Unreachable: interrupted is always set when we fall through
        None => Termination::Signaled,
    }
}

/// Capped stdout/stderr accumulators for one event.
///
/// Each stream stops growing once it crosses the cap; the marker is appended
/// exactly once so a reader can tell output was dropped.
pub struct OutputBuffers {
    cap: usize,
    pub stdout: String,
    pub stderr: String,
    stdout_truncated: bool,
    stderr_truncated: bool,
    dirty: bool,
}

impl OutputBuffers {
    pub fn new(cap: usize) -> Self {
        OutputBuffers {
            cap,
            stdout: String::new(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            dirty: false,
        }
    }

    pub fn push(&mut self, line: OutputLine) {
        let dirtied = match line {
            OutputLine::Stdout(text) => {
                Self::append(&mut self.stdout, &mut self.stdout_truncated, self.cap, &text)
            }
            OutputLine::Stderr(text) => {
                Self::append(&mut self.stderr, &mut self.stderr_truncated, self.cap, &text)
            }
        };
        self.dirty |= dirtied;
    }

    fn append(buf: &mut String, truncated: &mut bool, cap: usize, text: &str) -> bool {
        if *truncated {
            return false;
        }
        let appended = if buf.len() + text.len() + 1 > cap {
            *truncated = true;
            TRUNCATION_MARKER
        } else {
            text
        };
        if !buf.is_empty() {
            buf.push('\n');
        }
        buf.push_str(appended);
        true
    }

    /// True when there is unflushed output; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Per-project FIFO queues plus the set of projects with an active drain task.
///
/// The invariant carried here is the per-project mutual exclusion: a project
/// appears in `active` exactly while one drain task owns its queue, so two
/// events of the same project can never run concurrently.
#[derive(Default)]
struct QueueState {
    queues: HashMap<Uuid, VecDeque<Uuid>>,
    active: HashSet<Uuid>,
}

impl QueueState {
    /// Queue an event. Returns true when the project has no drain task yet
    /// and the caller must spawn one.
    fn enqueue(&mut self, project_id: Uuid, event_id: Uuid) -> bool {
        self.queues.entry(project_id).or_default().push_back(event_id);
        self.active.insert(project_id)
    }

    /// Pop the next event for a project, or release the project's active slot
    /// when its queue is drained.
    fn next(&mut self, project_id: Uuid) -> Option<Uuid> {
        match self.queues.get_mut(&project_id).and_then(|q| q.pop_front()) {
            Some(event_id) => Some(event_id),
            None => {
                self.queues.remove(&project_id);
                self.active.remove(&project_id);
                None
            }
        }
    }

    /// Remove a queued event before it starts. Returns the owning project id
    /// when the event was found.
    fn remove_event(&mut self, event_id: Uuid) -> Option<Uuid> {
        for (project_id, queue) in self.queues.iter_mut() {
            if let Some(pos) = queue.iter().position(|id| *id == event_id) {
                queue.remove(pos);
                return Some(*project_id);
            }
        }
        None
    }
}

/// Outcome of an operator cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The event was still queued and never started.
    Dequeued,
    /// The running subprocess was signalled to stop.
    Signalled,
}

struct ExecutorInner {
    db: DbPool,
    broadcaster: EventBroadcaster,
    config: ExecutorConfig,
    semaphore: Semaphore,
    queues: Mutex<QueueState>,
    running: Mutex<HashMap<Uuid, oneshot::Sender<()>>>,
}

/// Deploy executor service handle, shared across HTTP handlers.
#[derive(Clone)]
pub struct Executor {
    inner: Arc<ExecutorInner>,
}

impl Executor {
    pub fn new(db: DbPool, broadcaster: EventBroadcaster, config: ExecutorConfig) -> Self {
        let semaphore = Semaphore::new(config.max_concurrent);
        Executor {
            inner: Arc::new(ExecutorInner {
                db,
                broadcaster,
                config,
                semaphore,
                queues: Mutex::new(QueueState::default()),
                running: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Hand a pending event to its project queue. Never blocks on execution.
    pub fn submit(&self, project_id: Uuid, event_id: Uuid) {
        let newly_active = self
            .inner
            .queues
            .lock()
            .expect("queue mutex poisoned")
            .enqueue(project_id, event_id);

        if newly_active {
            let executor = self.clone();
            tokio::spawn(async move {
                executor.drain_project(project_id).await;
            });
        }
    }

    /// Cancel a queued or running event.
    ///
    /// A queued event transitions pending -> failed ("cancelled") without ever
    /// running; a running event has its subprocess killed and is finished by
    /// its drain task.
    pub async fn cancel(&self, event_id: Uuid) -> AppResult<CancelOutcome> {
        let dequeued = self
            .inner
            .queues
            .lock()
            .expect("queue mutex poisoned")
            .remove_event(event_id);

        if let Some(project_id) = dequeued {
            self.inner
                .db
                .finish_event_without_output(
                    event_id,
                    EventStatus::Failed,
                    Some("cancelled".to_string()),
                )
                .await?;
            self.broadcast_update(
                event_id,
                project_id,
                EventStatus::Failed.as_str(),
                Some("cancelled".to_string()),
            );
            info!(event_id = %event_id, "cancelled queued event");
            return Ok(CancelOutcome::Dequeued);
        }

        let signalled = self
            .inner
            .running
            .lock()
            .expect("running mutex poisoned")
            .remove(&event_id);

        if let Some(tx) = signalled {
            let _ = tx.send(());
            info!(event_id = %event_id, "signalled running event to stop");
            return Ok(CancelOutcome::Signalled);
        }

        Err(AppError::Validation(format!(
            "event {} is not pending or running",
            event_id
        )))
    }

    /// Startup recovery: fail events orphaned mid-run by a previous process
    /// and re-queue events that never started.
    pub async fn recover(&self) -> AppResult<()> {
        let orphaned = self
            .inner
            .db
            .list_events_by_status(EventStatus::Running)
            .await?;
        for event in orphaned {
            warn!(event_id = %event.id, "failing event orphaned by restart");
            self.inner
                .db
                .finish_event_without_output(
                    event.id,
                    EventStatus::Failed,
                    Some("interrupted by server restart".to_string()),
                )
                .await?;
        }

        let pending = self
            .inner
            .db
            .list_events_by_status(EventStatus::Pending)
            .await?;
        let requeued = pending.len();
        for event in pending {
            self.submit(event.project_id, event.id);
        }
        if requeued > 0 {
            info!("re-queued {} pending events", requeued);
        }

        Ok(())
    }

    /// Drain one project's queue, one event at a time.
    async fn drain_project(&self, project_id: Uuid) {
        loop {
            let next = self
                .inner
                .queues
                .lock()
                .expect("queue mutex poisoned")
                .next(project_id);

            let Some(event_id) = next else { break };

            // Global concurrency bound across all projects
            let permit = match self.inner.semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            self.run_event(project_id, event_id).await;
            drop(permit);
        }
    }

    /// Execute one event to a terminal status. Failures are captured into the
    /// event record; this never propagates an error to the drain loop.
    async fn run_event(&self, project_id: Uuid, event_id: Uuid) {
        let event = match self.inner.db.get_event_by_id(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                warn!(event_id = %event_id, "queued event vanished, skipping");
                return;
            }
            Err(e) => {
                error!(event_id = %event_id, "failed to load queued event: {}", e);
                return;
            }
        };

        // An operator may have corrected the record while it sat in the queue
        if event.status != EventStatus::Pending.as_str() {
            info!(event_id = %event_id, status = %event.status, "skipping non-pending event");
            return;
        }

        let project = match self.inner.db.get_project_by_id(project_id).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                let _ = self
                    .inner
                    .db
                    .finish_event_without_output(
                        event_id,
                        EventStatus::Failed,
                        Some("project no longer exists".to_string()),
                    )
                    .await;
                return;
            }
            Err(e) => {
                error!(event_id = %event_id, "failed to load project: {}", e);
                return;
            }
        };

        if let Err(e) = self.inner.db.mark_event_running(event_id).await {
            error!(event_id = %event_id, "failed to mark event running: {}", e);
            return;
        }
        self.broadcast_update(event_id, project_id, EventStatus::Running.as_str(), None);
        info!(
            event_id = %event_id,
            project = %project.name,
            branch = %event.branch,
            "deploy started"
        );

        let spec = ScriptSpec::from_project(&project, &event.branch, event.commit.as_deref());

        let (output_tx, mut output_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.inner
            .running
            .lock()
            .expect("running mutex poisoned")
            .insert(event_id, cancel_tx);

        let runner = tokio::spawn(run_script(spec, cancel_rx, output_tx));

        let mut buffers = OutputBuffers::new(self.inner.config.max_output_bytes);
        let mut flush = tokio::time::interval(self.inner.config.flush_interval);
        flush.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_line = output_rx.recv() => match maybe_line {
                    Some(line) => buffers.push(line),
                    None => break,
                },
                _ = flush.tick() => {
                    if buffers.take_dirty() {
                        if let Err(e) = self
                            .inner
                            .db
                            .update_event_output(
                                event_id,
                                buffers.stdout.clone(),
                                buffers.stderr.clone(),
                            )
                            .await
                        {
                            warn!(event_id = %event_id, "failed to flush output: {}", e);
                        }
                    }
                }
            }
        }

        let termination = match runner.await {
            Ok(termination) => termination,
            Err(e) => Termination::SpawnFailed(format!("runner task failed: {}", e)),
        };

        self.inner
            .running
            .lock()
            .expect("running mutex poisoned")
            .remove(&event_id);

        let (status, message) = match termination {
            Termination::Exited(0) => (EventStatus::Success, None),
            Termination::Exited(code) => {
                (EventStatus::Failed, Some(format!("exit code {}", code)))
            }
            Termination::Signaled => (
                EventStatus::Failed,
                Some("terminated by signal".to_string()),
            ),
            Termination::TimedOut(secs) => (
                EventStatus::Timedout,
                Some(format!("exceeded timeout of {}s", secs)),
            ),
            Termination::Cancelled => (EventStatus::Failed, Some("cancelled".to_string())),
            Termination::SpawnFailed(cause) => (EventStatus::Failed, Some(cause)),
        };

        if let Err(e) = self
            .inner
            .db
            .finish_event(
                event_id,
                status,
                message.clone(),
                buffers.stdout.clone(),
                buffers.stderr.clone(),
            )
            .await
        {
            error!(event_id = %event_id, "failed to record terminal status: {}", e);
        }

        info!(
            event_id = %event_id,
            project = %project.name,
            status = %status,
            "deploy finished"
        );
        self.broadcast_update(event_id, project_id, status.as_str(), message);
    }

    fn broadcast_update(
        &self,
        event_id: Uuid,
        project_id: Uuid,
        status: &str,
        message: Option<String>,
    ) {
        self.inner.broadcaster.send(WsEventMessage::new(WsEvent::event_updated(
            event_id,
            project_id,
            status.to_string(),
            message,
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(script: &str, timeout_secs: u64) -> ScriptSpec {
        ScriptSpec {
            script: script.to_string(),
            timeout_secs,
            branch: "main".to_string(),
            commit: Some("abc123".to_string()),
            site: None,
            site_config_path: None,
        }
    }

    /// Run a script and collect its termination plus captured lines.
    async fn run_collect(spec: ScriptSpec) -> (Termination, Vec<String>, Vec<String>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();
        let termination = run_script(spec, cancel_rx, tx).await;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Ok(line) = rx.try_recv() {
            match line {
                OutputLine::Stdout(l) => stdout.push(l),
                OutputLine::Stderr(l) => stderr.push(l),
            }
        }
        (termination, stdout, stderr)
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let (termination, stdout, stderr) =
            run_collect(spec("echo deploying; echo warn >&2", 0)).await;
        assert_eq!(termination, Termination::Exited(0));
        assert_eq!(stdout, vec!["deploying".to_string()]);
        assert_eq!(stderr, vec!["warn".to_string()]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_code_is_reported() {
        let (termination, _, _) = run_collect(spec("exit 3", 0)).await;
        assert_eq!(termination, Termination::Exited(3));
    }

    #[tokio::test]
    async fn test_missing_script_path_fails_with_shell_exit() {
        let (termination, _, stderr) = run_collect(spec("/nonexistent/deploy.sh", 0)).await;
        // sh reports 127 for a command it cannot find
        assert_eq!(termination, Termination::Exited(127));
        assert!(!stderr.is_empty());
    }

    #[tokio::test]
    async fn test_trigger_parameters_reach_the_script() {
        let (termination, stdout, _) =
            run_collect(spec("echo $DEPLOY_BRANCH $DEPLOY_COMMIT", 0)).await;
        assert_eq!(termination, Termination::Exited(0));
        assert_eq!(stdout, vec!["main abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_timeout_kills_long_running_script() {
        let start = std::time::Instant::now();
        let (termination, _, _) = run_collect(spec("sleep 10", 1)).await;
        assert_eq!(termination, Termination::TimedOut(1));
        // Well under the script's 10s sleep: the child was killed, not awaited
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancel_kills_running_script() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let start = std::time::Instant::now();
        let runner = tokio::spawn(run_script(spec("sleep 10", 0), cancel_rx, tx));

        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel_tx.send(()).unwrap();

        let termination = runner.await.unwrap();
        assert_eq!(termination, Termination::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_output_before_timeout_is_captured() {
        let (termination, stdout, _) =
            run_collect(spec("echo started; sleep 10", 1)).await;
        assert_eq!(termination, Termination::TimedOut(1));
        assert_eq!(stdout, vec!["started".to_string()]);
    }

    #[test]
    fn test_output_buffers_cap_with_marker() {
        let mut buffers = OutputBuffers::new(30);
        buffers.push(OutputLine::Stdout("0123456789".to_string()));
        buffers.push(OutputLine::Stdout("0123456789".to_string()));
        // This line would cross the cap
        buffers.push(OutputLine::Stdout("0123456789".to_string()));
        // Dropped entirely once truncated
        buffers.push(OutputLine::Stdout("more".to_string()));

        let lines: Vec<&str> = buffers.stdout.lines().collect();
        assert_eq!(
            lines,
            vec!["0123456789", "0123456789", TRUNCATION_MARKER]
        );

        // Streams are capped independently
        buffers.push(OutputLine::Stderr("err".to_string()));
        assert_eq!(buffers.stderr, "err");
    }

    #[test]
    fn test_output_buffers_dirty_tracking() {
        let mut buffers = OutputBuffers::new(1024);
        assert!(!buffers.take_dirty());

        buffers.push(OutputLine::Stdout("line".to_string()));
        assert!(buffers.take_dirty());
        assert!(!buffers.take_dirty());
    }

    #[test]
    fn test_queue_state_serializes_per_project() {
        let mut state = QueueState::default();
        let project = Uuid::new_v4();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        // First event activates the project, second does not
        assert!(state.enqueue(project, a));
        assert!(!state.enqueue(project, b));

        // FIFO order, then the active slot is released
        assert_eq!(state.next(project), Some(a));
        assert_eq!(state.next(project), Some(b));
        assert_eq!(state.next(project), None);

        // Released project activates again
        assert!(state.enqueue(project, a));
    }

    #[test]
    fn test_queue_state_independent_projects() {
        let mut state = QueueState::default();
        let (p1, p2) = (Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        // Each project gets its own drain task
        assert!(state.enqueue(p1, a));
        assert!(state.enqueue(p2, b));
    }

    #[test]
    fn test_queue_state_remove_queued_event() {
        let mut state = QueueState::default();
        let project = Uuid::new_v4();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());

        state.enqueue(project, a);
        state.enqueue(project, b);

        assert_eq!(state.remove_event(b), Some(project));
        assert_eq!(state.remove_event(b), None);

        assert_eq!(state.next(project), Some(a));
        assert_eq!(state.next(project), None);
    }

    #[test]
    fn test_script_spec_from_project_normalizes_timeout() {
        use chrono::Utc;

        let project = deploy_project::Model {
            id: Uuid::new_v4(),
            name: "site".to_string(),
            full_name: "acme/site".to_string(),
            script: "./deploy.sh".to_string(),
            script_timeout: Some(0),
            branch: "main".to_string(),
            site: None,
            site_config_path: None,
            site_config: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // 0 and None both mean "no timeout"
        let spec = ScriptSpec::from_project(&project, "main", None);
        assert_eq!(spec.timeout_secs, 0);

        let project = deploy_project::Model {
            script_timeout: None,
            ..project
        };
        let spec = ScriptSpec::from_project(&project, "feature", Some("abc"));
        assert_eq!(spec.timeout_secs, 0);
        assert_eq!(spec.branch, "feature");
        assert_eq!(spec.commit.as_deref(), Some("abc"));
    }
}
