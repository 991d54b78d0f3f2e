//! A child that traps and ignores its stop signal gets escalated to
//! SIGKILL once `stopTimeout` elapses.

use std::os::unix::fs::PermissionsExt;

use crate::harness::Daemon;

#[test]
#[serial_test::serial]
fn escalates_to_sigkill_once_the_child_ignores_sigint() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker.txt");
    let script = dir.path().join("ignore_int.sh");
    std::fs::write(
        &script,
        "#!/bin/sh\ntrap 'echo \"INT caught\" >> \"$1\"' INT\nwhile true; do :; done\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let yaml = format!(
        r#"
- id: "0"
  command: "{} {}"
  instances: "1"
  atLaunch: "true"
  stopSignal: "SIGINT"
  stopTimeout: "3"
  startCheckup: "0"
"#,
        script.display(),
        marker.display()
    );
    let mut daemon = Daemon::start(&yaml);

    assert!(
        daemon.wait_for_log("Successfully Started after 0 second(s)"),
        "log:\n{}",
        daemon.log()
    );

    daemon.send("stop 0");

    assert!(
        daemon.wait_for_log("did not stop after timeout of 3 seconds SIGKILL issued"),
        "log:\n{}",
        daemon.log()
    );
    assert!(
        daemon.wait_for_log("exited with status: signal: killed"),
        "log:\n{}",
        daemon.log()
    );
    assert_eq!(std::fs::read_to_string(&marker).unwrap_or_default().trim(), "INT caught");

    daemon.shutdown();
}
