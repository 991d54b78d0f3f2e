use super::*;
use std::sync::Arc;
use std::time::Duration;
use tm_core::{ExitState, JobConfig, RestartPolicy, Signal};
use tm_process::FakeProcessAdapter;

fn config() -> JobConfig {
    JobConfig::builder().argv(&["/bin/sleep", "9999"]).build()
}

fn instance(cfg: JobConfig, process: FakeProcessAdapter) -> Arc<Instance<FakeProcessAdapter, tm_core::FakeClock>> {
    Instance::new(0, 0, Arc::new(cfg), process, tm_core::FakeClock::new())
}

#[tokio::test]
async fn starts_and_reaches_running_immediately_with_no_checkup() {
    let process = FakeProcessAdapter::new();
    let instance = instance(config(), process);
    let latch = instance.start(true).await;
    assert!(latch.is_resolved());
    assert_eq!(instance.status().await, InstanceStatus::Running);
    assert!(instance.pid().await.is_some());
}

#[tokio::test]
async fn exit_with_never_policy_settles_to_exited_without_restart() {
    let process = FakeProcessAdapter::new();
    process.push_exit(ExitState::Code(0));
    let instance = instance(config(), process.clone());

    instance.start(true).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(process.spawn_calls().len(), 1);
    assert_eq!(instance.status().await, InstanceStatus::Exited(ExitState::Code(0)));
}

#[tokio::test]
async fn unexpected_policy_restarts_on_mismatched_exit_and_caps_at_max_restarts() {
    // Every launch attempt, whether it is itself a retry of a failed start
    // or a fresh run following an unexpected exit, counts against the same
    // max_restarts budget for the life of one start() call: max_restarts=N
    // yields exactly N+1 total launches.
    let mut cfg = config();
    cfg.restart_policy = RestartPolicy::Unexpected;
    cfg.expected_exit = 0;
    cfg.max_restarts = 2;
    let process = FakeProcessAdapter::new();
    process.push_exit(ExitState::Code(1));
    process.push_exit(ExitState::Code(1));
    process.push_exit(ExitState::Code(1));
    let instance = instance(cfg, process.clone());

    instance.start(true).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(process.spawn_calls().len(), 3);
    assert_eq!(instance.status().await, InstanceStatus::Exited(ExitState::Code(1)));
}

#[tokio::test]
async fn expected_exit_never_restarts() {
    let mut cfg = config();
    cfg.restart_policy = RestartPolicy::Unexpected;
    cfg.expected_exit = 0;
    let process = FakeProcessAdapter::new();
    process.push_exit(ExitState::Code(0));
    let instance = instance(cfg, process.clone());

    instance.start(true).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(process.spawn_calls().len(), 1);
    assert_eq!(instance.status().await, InstanceStatus::Exited(ExitState::Code(0)));
}

#[tokio::test]
async fn always_policy_restarts_even_on_expected_exit_code() {
    let mut cfg = config();
    cfg.restart_policy = RestartPolicy::Always;
    cfg.expected_exit = 0;
    cfg.max_restarts = 1;
    let process = FakeProcessAdapter::new();
    process.push_exit(ExitState::Code(0));
    process.push_exit(ExitState::Code(0));
    let instance = instance(cfg, process.clone());

    instance.start(true).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(process.spawn_calls().len(), 2);
}

#[tokio::test]
async fn failed_exec_retries_until_max_restarts_then_start_failed() {
    let mut cfg = config();
    cfg.max_restarts = 2;
    let process = FakeProcessAdapter::new();
    process.fail_next_spawn();
    process.fail_next_spawn();
    process.fail_next_spawn();
    let instance = instance(cfg, process.clone());

    let latch = instance.start(true).await;
    assert!(latch.is_resolved());
    assert!(matches!(
        instance.status().await,
        InstanceStatus::StartFailed(_)
    ));
}

#[tokio::test]
async fn start_is_a_noop_while_already_starting() {
    let process = FakeProcessAdapter::new();
    let instance = instance(config(), process.clone());
    let first = instance.start(false).await;
    let second = instance.start(true).await;
    assert!(second.is_resolved());
    first.wait().await;
    assert_eq!(process.spawn_calls().len(), 1);
}

#[tokio::test]
async fn stop_signals_the_process_group_then_observes_clean_exit() {
    let mut cfg = config();
    cfg.stop_signal = Some(Signal::SIGINT);
    cfg.stop_timeout_secs = 5;
    let process = FakeProcessAdapter::new();
    let instance = instance(cfg, process.clone());
    instance.start(true).await;
    let pid = instance.pid().await.unwrap();

    let stopper = {
        let instance = Arc::clone(&instance);
        tokio::spawn(async move { instance.stop(true).await })
    };
    tokio::task::yield_now().await;

    let calls = process.signal_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].pgid, -pid);
    assert_eq!(calls[0].signal, Signal::SIGINT);

    process.resolve_pid(pid, ExitState::Signaled(Signal::SIGINT));
    stopper.await.unwrap();

    assert!(instance.status().await.is_terminal());
    assert!(process
        .signal_calls()
        .iter()
        .all(|c| c.signal != Signal::SIGKILL));
}

#[tokio::test]
async fn stop_escalates_to_sigkill_after_timeout() {
    tokio::time::pause();
    let mut cfg = config();
    cfg.stop_signal = Some(Signal::SIGINT);
    cfg.stop_timeout_secs = 1;
    let process = FakeProcessAdapter::new();
    let instance = instance(cfg, process.clone());
    instance.start(true).await;
    let pid = instance.pid().await.unwrap();

    let stopper = {
        let instance = Arc::clone(&instance);
        tokio::spawn(async move { instance.stop(true).await })
    };
    tokio::time::advance(Duration::from_secs(2)).await;
    // The fake child never honors the signal on its own; resolve it only
    // after the timeout has had a chance to fire the escalation.
    process.resolve_pid(pid, ExitState::Signaled(Signal::SIGKILL));
    stopper.await.unwrap();

    let calls = process.signal_calls();
    assert!(calls
        .iter()
        .any(|c| c.signal == Signal::SIGKILL && c.pgid == -pid));
}

#[tokio::test]
async fn stop_without_configured_signal_sends_nothing_but_still_kills_on_timeout() {
    tokio::time::pause();
    let mut cfg = config();
    cfg.stop_signal = None;
    cfg.stop_timeout_secs = 1;
    let process = FakeProcessAdapter::new();
    let instance = instance(cfg, process.clone());
    instance.start(true).await;
    let pid = instance.pid().await.unwrap();

    let stopper = {
        let instance = Arc::clone(&instance);
        tokio::spawn(async move { instance.stop(true).await })
    };
    tokio::time::advance(Duration::from_secs(2)).await;
    process.resolve_pid(pid, ExitState::Signaled(Signal::SIGKILL));
    stopper.await.unwrap();

    let calls = process.signal_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].signal, Signal::SIGKILL);
}

#[tokio::test]
async fn start_checkup_dwell_promotes_to_running_after_surviving() {
    let mut cfg = config();
    cfg.start_checkup_secs = 1;
    let process = FakeProcessAdapter::new();
    let instance = instance(cfg, process.clone());

    let latch = instance.start(false).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(instance.status().await, InstanceStatus::Starting);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(latch.is_resolved());
    assert_eq!(instance.status().await, InstanceStatus::Running);
}

#[tokio::test]
async fn dying_during_checkup_goes_to_backoff_then_start_failed() {
    let mut cfg = config();
    cfg.start_checkup_secs = 1;
    cfg.max_restarts = 0;
    let process = FakeProcessAdapter::new();
    process.push_exit(ExitState::Code(1));
    let instance = instance(cfg, process.clone());

    let latch = instance.start(true).await;
    assert!(latch.is_resolved());
    assert!(matches!(
        instance.status().await,
        InstanceStatus::StartFailed(_)
    ));
}
