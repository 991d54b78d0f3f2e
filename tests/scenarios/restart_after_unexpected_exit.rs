//! A job configured `restartPolicy: unexpected` with a mismatched
//! `expectedExit` restarts on every exit up to `maxRestarts`, logging the
//! "unexpected exit code" line each time.

use crate::harness;
use crate::harness::Daemon;

#[test]
#[serial_test::serial]
fn restarts_five_times_then_makes_a_final_sixth_attempt() {
    let yaml = r#"
- id: "0"
  command: "/bin/false"
  instances: "1"
  atLaunch: "true"
  restartPolicy: "unexpected"
  expectedExit: "0"
  maxRestarts: "5"
  startCheckup: "0"
"#;
    let daemon = Daemon::start(yaml);

    assert!(
        harness::wait_for(harness::WAIT_MAX, || {
            daemon
                .log()
                .matches("Encountered unexpected exit code 1, restarting")
                .count()
                >= 5
        }),
        "log:\n{}",
        daemon.log()
    );

    // Exactly five restarts: the sixth (final) launch exhausts the budget
    // and settles to `Exited` without logging another "restarting" line.
    assert_eq!(
        daemon
            .log()
            .matches("Encountered unexpected exit code 1, restarting")
            .count(),
        5,
        "log:\n{}",
        daemon.log()
    );

    daemon.shutdown();
}
