//! A command that can't even exec (`foo`, not found on PATH) counts launch
//! attempts against `maxRestarts` the same as a runtime exit does, and
//! lands in `start_failed` once the budget is exhausted.

use crate::harness::{self, Daemon};

#[test]
#[serial_test::serial]
fn exhausts_max_restarts_then_reports_creation_failed() {
    let yaml = r#"
- id: "0"
  command: "foo"
  instances: "1"
  atLaunch: "true"
  maxRestarts: "5"
  startCheckup: "0"
"#;
    let daemon = Daemon::start(yaml);

    assert!(
        harness::wait_for(harness::WAIT_MAX, || daemon
            .log()
            .matches("failed to start with error")
            .count()
            >= 6),
        "log:\n{}",
        daemon.log()
    );
    assert!(daemon.log().contains("no such file or directory"), "log:\n{}", daemon.log());
    assert!(daemon.wait_for_log("Creation failed"), "log:\n{}", daemon.log());

    daemon.shutdown();
}
