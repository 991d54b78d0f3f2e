//! Same shape as the unexpected-exit scenario, but `expectedExit` matches
//! the child's actual exit code: `unexpected` policy must not restart it.

use crate::harness::Daemon;

#[test]
#[serial_test::serial]
fn does_not_restart_when_exit_code_matches_expected_exit() {
    let yaml = r#"
- id: "0"
  command: "/bin/false"
  instances: "1"
  atLaunch: "true"
  restartPolicy: "unexpected"
  expectedExit: "1"
  maxRestarts: "5"
  startCheckup: "0"
"#;
    let daemon = Daemon::start(yaml);

    assert!(
        daemon.wait_for_log("exited with status: exit status 1"),
        "log:\n{}",
        daemon.log()
    );
    // Give any would-be erroneous restart a chance to show up before asserting its absence.
    std::thread::sleep(std::time::Duration::from_millis(500));
    assert!(
        !daemon.log().contains("Encountered unexpected exit code"),
        "log:\n{}",
        daemon.log()
    );

    daemon.shutdown();
}
