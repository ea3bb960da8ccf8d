//! Scheduler single-flight behavior.

mod common;

use common::*;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn concurrent_triggers_collapse_into_one_pass() {
    let (state, remote) = state_with_mock().await;
    let scheduler = state.scheduler().clone();

    // Hold the first pass inside its session check
    let gate = Arc::new(Notify::new());
    *remote.session_gate.lock().unwrap() = Some(gate.clone());

    let first = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_once().await })
    };

    // Let the spawned pass reach the gate
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // A trigger arriving mid-pass is dropped, not queued
    assert!(!scheduler.run_once().await);

    // Release the held pass and let it finish
    *remote.session_gate.lock().unwrap() = None;
    gate.notify_one();
    assert!(first.await.unwrap());

    // The lock is released afterwards
    assert!(scheduler.run_once().await);
}

#[tokio::test]
async fn lock_is_released_even_when_the_pass_errors() {
    let (state, remote) = state_with_mock().await;
    let scheduler = state.scheduler().clone();

    // No session and no cached identity: the pass stops with login_required
    *remote.session.lock().unwrap() = None;
    assert!(scheduler.run_once().await);

    // A subsequent pass still acquires the lock
    assert!(scheduler.run_once().await);
}
