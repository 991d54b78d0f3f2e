use super::*;
use tm_core::Redirections;

fn args(command: &[&str]) -> SpawnArgs {
    SpawnArgs {
        command: command.iter().map(|s| s.to_string()).collect(),
        env_vars: Vec::new(),
        working_dir: None,
        umask: 0o022,
        redirections: Redirections::default(),
    }
}

#[tokio::test]
async fn spawns_and_waits_for_exit_code() {
    let adapter = RealProcessAdapter::new();
    let mut handle = adapter.spawn(&args(&["/bin/sh", "-c", "exit 7"])).await.unwrap();
    let state = handle.wait().await.unwrap();
    assert_eq!(state, ExitState::Code(7));
}

#[tokio::test]
async fn spawned_child_gets_its_own_process_group() {
    let adapter = RealProcessAdapter::new();
    let mut handle = adapter
        .spawn(&args(&["/bin/sh", "-c", "echo $$"]))
        .await
        .unwrap();
    let pid = handle.pid();
    assert!(pid > 0);
    let _ = handle.wait().await.unwrap();
}

#[tokio::test]
async fn probe_is_true_while_running_false_after_reap() {
    let adapter = RealProcessAdapter::new();
    let mut handle = adapter
        .spawn(&args(&["/bin/sh", "-c", "sleep 0.2"]))
        .await
        .unwrap();
    assert!(adapter.probe(handle.pid()));
    let _ = handle.wait().await.unwrap();
}

#[tokio::test]
async fn missing_executable_is_a_spawn_error() {
    let adapter = RealProcessAdapter::new();
    let result = adapter.spawn(&args(&["/no/such/executable"])).await;
    assert!(matches!(result, Err(SpawnError::Exec { .. })));
}

#[test]
fn inherited_umask_round_trips_without_disturbing_process_state() {
    let before = inherited_umask();
    let after = inherited_umask();
    assert_eq!(before, after);
}
