//! Integration tests for deploy script execution.
//!
//! These drive real /bin/sh subprocesses through the executor's script
//! runner and assert the terminal outcomes the event lifecycle depends on.

use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};

use deployd_lib::services::executor::{OutputLine, ScriptSpec, Termination, run_script};

fn spec(script: &str, timeout_secs: u64) -> ScriptSpec {
    ScriptSpec {
        script: script.to_string(),
        timeout_secs,
        branch: "main".to_string(),
        commit: None,
        site: Some("production".to_string()),
        site_config_path: None,
    }
}

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
async fn script_file_runs_with_captured_output() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("deploy.sh");
    std::fs::write(
        &script_path,
        "#!/bin/sh\necho deploying to $DEPLOY_SITE\necho done\n",
    )
    .unwrap();

    let (termination, stdout, stderr) =
        run_collect(spec(&format!("sh {}", script_path.display()), 0)).await;

    assert_eq!(termination, Termination::Exited(0));
    assert_eq!(
        stdout,
        vec!["deploying to production".to_string(), "done".to_string()]
    );
    assert!(stderr.is_empty());
}

#[tokio::test]
async fn nonzero_exit_reports_the_code() {
    let (termination, _, stderr) =
        run_collect(spec("echo failing >&2; exit 1", 0)).await;

    assert_eq!(termination, Termination::Exited(1));
    assert_eq!(stderr, vec!["failing".to_string()]);
}

#[tokio::test]
async fn timeout_terminates_the_subprocess() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("deployed");

    // The marker would only appear if the subprocess survived the timeout
    let script = format!("sleep 3 && touch {}", marker.display());

    let start = Instant::now();
    let (termination, _, _) = run_collect(spec(&script, 1)).await;

    assert_eq!(termination, Termination::TimedOut(1));
    assert!(
        start.elapsed() < Duration::from_secs(3),
        "timeout did not fire promptly"
    );

    // Give a surviving process time to reach the touch
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(
        !marker.exists(),
        "subprocess still ran to completion after timeout"
    );
}

#[tokio::test]
async fn cancel_terminates_the_subprocess() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("deployed");
    let script = format!("sleep 3 && touch {}", marker.display());

    let (tx, _rx) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let runner = tokio::spawn(run_script(spec(&script, 0), cancel_rx, tx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel_tx.send(()).unwrap();

    assert_eq!(runner.await.unwrap(), Termination::Cancelled);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!marker.exists(), "subprocess survived cancellation");
}

#[tokio::test]
async fn interleaved_streams_are_kept_separate() {
    let (termination, stdout, stderr) = run_collect(spec(
        "echo out1; echo err1 >&2; echo out2; echo err2 >&2",
        0,
    ))
    .await;

    assert_eq!(termination, Termination::Exited(0));
    assert_eq!(stdout, vec!["out1".to_string(), "out2".to_string()]);
    assert_eq!(stderr, vec!["err1".to_string(), "err2".to_string()]);
}
