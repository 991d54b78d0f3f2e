use super::*;
use std::time::Duration;

#[tokio::test]
async fn wait_returns_once_resolved() {
    let latch = Latch::new();
    assert!(!latch.is_resolved());
    latch.resolve();
    assert!(latch.is_resolved());
    latch.wait().await;
}

#[tokio::test]
async fn wait_returns_immediately_if_already_resolved_before_any_waiter() {
    let latch = Latch::new();
    latch.resolve();
    tokio::time::timeout(Duration::from_millis(50), latch.wait())
        .await
        .expect("wait should not block once already resolved");
}

#[tokio::test]
async fn resolve_is_idempotent() {
    let latch = Latch::new();
    latch.resolve();
    latch.resolve();
    assert!(latch.is_resolved());
}

#[tokio::test]
async fn wakes_a_concurrently_waiting_task() {
    let latch = Latch::new();
    let waiter = {
        let latch = latch.clone();
        tokio::spawn(async move {
            latch.wait().await;
        })
    };
    tokio::task::yield_now().await;
    latch.resolve();
    tokio::time::timeout(Duration::from_millis(200), waiter)
        .await
        .expect("waiter should complete after resolve")
        .expect("task should not panic");
}
