//! SIGHUP reload classifies jobs into current/changed/new/old and the
//! daemon logs the resulting bucket sizes.

use crate::harness::{self, Daemon};
use nix::sys::signal::Signal;

#[test]
#[serial_test::serial]
fn reload_classifies_unchanged_changed_new_and_dropped_jobs() {
    let initial = r#"
- id: "16"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
- id: "17"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
- id: "18"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
"#;
    let daemon = Daemon::start(initial);
    assert!(
        harness::wait_for(harness::WAIT_MAX, || {
            daemon
                .log()
                .matches("Successfully Started after 0 second(s)")
                .count()
                >= 3
        }),
        "log:\n{}",
        daemon.log()
    );

    let reloaded = r#"
- id: "16"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
- id: "17"
  command: "/bin/sleep 9999"
  instances: "2"
  atLaunch: "true"
- id: "19"
  command: "/bin/sleep 9999"
  instances: "1"
  atLaunch: "true"
"#;
    daemon.rewrite_config(reloaded);
    daemon.signal(Signal::SIGHUP);

    assert!(daemon.wait_for_log("reload complete"), "log:\n{}", daemon.log());
    let log = daemon.log();
    assert!(log.contains("current=1"), "log:\n{log}");
    assert!(log.contains("changed=1"), "log:\n{log}");
    assert!(log.contains("new=2"), "log:\n{log}");
    assert!(log.contains("old=1"), "log:\n{log}");

    daemon.shutdown();
}
