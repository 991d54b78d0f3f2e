//! Start one job at launch, stop it through the REPL, and check the
//! expected log lines appear in order.

use crate::harness::Daemon;

#[test]
#[serial_test::serial]
fn start_then_stop_single_instance() {
    let yaml = r#"
- id: "0"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
  startCheckup: "1"
  stopSignal: "SIGINT"
  stopTimeout: "5"
"#;
    let mut daemon = Daemon::start(yaml);

    assert!(
        daemon.wait_for_log("Successfully Started after 1 second(s)"),
        "log:\n{}",
        daemon.log()
    );

    daemon.send("stop 0");

    assert!(daemon.wait_for_log("Sending Signal interrupt"), "log:\n{}", daemon.log());
    assert!(
        daemon.wait_for_log("exited with status: signal: interrupt"),
        "log:\n{}",
        daemon.log()
    );
    assert!(
        daemon.wait_for_log("stopped by user, not restarting"),
        "log:\n{}",
        daemon.log()
    );

    daemon.shutdown();
}
