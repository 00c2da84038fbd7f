//! Runs the binary against shell-script stand-ins for `ss` and `lsof`.
//!
//! Kept as the only test in this binary: writing an executable while another
//! test thread forks can make exec fail with ETXTBSY.

use std::process::{Command, Output};

fn bindscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bindscan"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

#[cfg(unix)]
#[test]
fn test_fake_tools_end_to_end() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
        path.display().to_string()
    }

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let services = dir.path().join("services");
    fs::write(&services, "ssh 22/tcp\n").expect("Failed to write services");
    let services = services.display().to_string();

    let ss = script(
        dir.path(),
        "ss",
        r#"case "$*" in
  *-t*) echo 'tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:* users:(("sshd",pid=450,fd=3))' ;;
  *) exit 0 ;;
esac"#,
    );
    let failing_ss = script(dir.path(), "ss-broken", "exit 1");
    let lsof = script(
        dir.path(),
        "lsof",
        r#"case "$*" in
  *TCP*) echo 'COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME'
         echo 'nginx 900 root 6u IPv4 12350 0t0 TCP *:80 (LISTEN)' ;;
  *) exit 1 ;;
esac"#,
    );

    // Primary answers: its record is reported, lsof's is not.
    let output = bindscan(&[
        "--ss-path", &ss, "--lsof-path", &lsof, "--services-file", &services, "--json",
    ]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Expected valid JSON");
    assert_eq!(
        json,
        serde_json::json!([{
            "protocol": "tcp",
            "port": 22,
            "service_name": "ssh",
            "process_name": "sshd",
            "pid": 450,
            "state": "LISTEN",
            "local_address": "0.0.0.0",
        }])
    );

    // Primary fails: lsof's output is used instead.
    let output = bindscan(&[
        "--ss-path", &failing_ss, "--lsof-path", &lsof, "--services-file", &services,
        "describe", "80",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "tcp port 80 (unknown): process nginx (pid 900), state LISTEN"
    );

    // Port shorthand filters the report.
    let output = bindscan(&[
        "--ss-path", &ss, "--lsof-path", &lsof, "--services-file", &services,
        "--json", "80",
    ]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Expected valid JSON");
    assert_eq!(json, serde_json::json!([]));
}
