//! Command loop dispatch and launcher session outcomes.

#![cfg(unix)]

mod common;

use std::time::Duration;
use tokio::sync::mpsc;

use common::{idle_backend, sh, test_config, wait_for, Harness, RecordingRunner, FRONTEND_BUILD};
use devsup::cli::{CommandLoop, LoopExit};
use devsup::{LaunchOptions, LaunchOutcome, Launcher, ProcessState, Role};

fn scripted_input(lines: &[&str]) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(lines.len().max(1));
    for line in lines {
        tx.try_send((*line).to_string()).expect("channel has room");
    }
    rx
}

#[tokio::test]
async fn test_loop_dispatches_until_end_of_input() {
    let harness = Harness::new(test_config(idle_backend()));
    let input = scripted_input(&["s", "", "p", "bogus", "s backend"]);

    let exit = CommandLoop::new(harness.supervisor.clone(), input).run().await;

    assert_eq!(exit, LoopExit::EndOfInput);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::Running));
    // The second start was refused, so exactly one spawn happened.
    let starts = harness
        .supervisor
        .transitions(Role::Backend)
        .await
        .iter()
        .filter(|t| t.to == ProcessState::Running)
        .count();
    assert_eq!(starts, 1);

    harness.supervisor.shutdown().await;
}

#[tokio::test]
async fn test_quit_stops_reading_further_commands() {
    let harness = Harness::new(test_config(idle_backend()));
    let input = scripted_input(&["k", "q", "s"]);

    let exit = CommandLoop::new(harness.supervisor.clone(), input).run().await;

    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::NotStarted));
}

#[tokio::test]
async fn test_cancellation_ends_a_waiting_loop() {
    let harness = Harness::new(test_config(idle_backend()));
    let (_tx, rx) = mpsc::channel::<String>(1);
    let token = harness.supervisor.shutdown_token();

    let command_loop = CommandLoop::new(harness.supervisor.clone(), rx);
    let run = tokio::spawn(command_loop.run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let exit = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("loop should end")
        .expect("loop task");
    assert_eq!(exit, LoopExit::Cancelled);
}

#[tokio::test]
async fn test_restart_commands_run_their_operations() {
    let harness = Harness::new(test_config(idle_backend()));
    let input = scripted_input(&["f", "b", "k backend"]);

    CommandLoop::new(harness.supervisor.clone(), input).run().await;

    assert_eq!(
        harness.runner.calls(),
        vec![FRONTEND_BUILD, common::BACKEND_BUILD]
    );
    assert_eq!(harness.assets.copies().len(), 1);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::Stopped));
}

#[tokio::test]
async fn test_session_drains_registry_on_quit() {
    let harness = Harness::new(test_config(idle_backend()));
    let options = LaunchOptions {
        interactive: true,
        open_browser: false,
        skip_startup: false,
    };
    let launcher = Launcher::with_supervisor(harness.supervisor.clone(), options);

    let outcome = launcher.run_with_input(Some(scripted_input(&["p", "q"]))).await;

    assert_eq!(outcome, LaunchOutcome::Quit);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::Stopped));
    assert!(harness.supervisor.is_shutting_down());
}

#[tokio::test]
async fn test_session_reports_startup_failure() {
    let harness = Harness::with_runner(
        test_config(idle_backend()),
        RecordingRunner::failing(&[FRONTEND_BUILD]),
    );
    let launcher = Launcher::with_supervisor(harness.supervisor.clone(), LaunchOptions::default());

    let outcome = launcher.run_with_input(Some(scripted_input(&["q"]))).await;

    assert_eq!(outcome, LaunchOutcome::StartupFailed);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::NotStarted));
    assert_eq!(harness.browser.opened(), 0);
}

#[tokio::test]
async fn test_cancelled_session_drains_running_backend() {
    let harness = Harness::new(test_config(idle_backend()));
    let options = LaunchOptions {
        interactive: true,
        open_browser: false,
        skip_startup: false,
    };
    let launcher = Launcher::with_supervisor(harness.supervisor.clone(), options);
    let (_tx, rx) = mpsc::channel::<String>(1);

    let session = tokio::spawn(async move { launcher.run_with_input(Some(rx)).await });

    let supervisor = &harness.supervisor;
    assert!(
        wait_for(
            move || async move { supervisor.state(Role::Backend).await == Some(ProcessState::Running) },
            5_000
        )
        .await
    );
    harness.supervisor.shutdown_token().cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), session)
        .await
        .expect("session should end")
        .expect("session task");
    assert_eq!(outcome, LaunchOutcome::Cancelled);
    assert_eq!(outcome.exit_code(), 130);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::Stopped));
    assert_eq!(harness.supervisor.active_readers(Role::Backend).await, 0);
}

#[tokio::test]
async fn test_session_without_input_watches_for_crashes() {
    let harness = Harness::new(test_config(sh("echo up; sleep 0.3; exit 7")));
    let options = LaunchOptions {
        interactive: false,
        open_browser: false,
        skip_startup: false,
    };
    let launcher = Launcher::with_supervisor(harness.supervisor.clone(), options);

    let session = tokio::spawn(async move { launcher.run_with_input(None).await });

    // Nothing but the poll loop refreshes the handle here.
    let supervisor = &harness.supervisor;
    assert!(
        wait_for(
            move || async move { supervisor.state(Role::Backend).await == Some(ProcessState::Failed) },
            5_000
        )
        .await,
        "crash was never noticed"
    );
    assert!(!session.is_finished());

    harness.supervisor.shutdown_token().cancel();
    let outcome = tokio::time::timeout(Duration::from_secs(5), session)
        .await
        .expect("session should end")
        .expect("session task");
    assert_eq!(outcome, LaunchOutcome::Cancelled);
    assert_eq!(harness.supervisor.state(Role::Backend).await, Some(ProcessState::Failed));
}
