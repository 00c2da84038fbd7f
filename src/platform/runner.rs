use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs an external command and returns its stdout.
///
/// A missing binary, a non-zero exit and a timeout are all errors; callers
/// decide whether those are fatal.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<String>;
}

/// Runs real processes, killing any that outlive the timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<String> {
        let name = program.display().to_string();

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ToolMissing { program: name });
            }
            Err(e) => return Err(e.into()),
        };

        // Drain both pipes so a chatty tool can't block on a full buffer.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let timed_out = || Error::Timeout {
            program: name.clone(),
            timeout: self.timeout,
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    abort(&mut child);
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                abort(&mut child);
                return Err(timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        };

        // A descendant can keep the pipes open after the child exits.
        let stdout = collect(stdout, deadline).ok_or_else(timed_out)?;
        let stderr = collect(stderr, deadline).ok_or_else(timed_out)?;

        if !status.success() {
            return Err(Error::ToolFailed {
                program: name,
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

/// Kill and reap a child we are giving up on.
fn abort(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Wait for a drained pipe until `deadline`; `None` means it stayed open.
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };

    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> SystemRunner {
        SystemRunner::new(Duration::from_secs(5))
    }

    #[test]
    fn test_missing_binary() {
        let result = runner().run(Path::new("/nonexistent/bindscan-tool"), &[]);
        assert!(matches!(result, Err(Error::ToolMissing { .. })));
    }

    #[test]
    fn test_captures_stdout() {
        let output = runner().run(Path::new("sh"), &["-c", "echo hello"]).unwrap();
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn test_non_zero_exit() {
        let result = runner().run(Path::new("sh"), &["-c", "echo oops >&2; exit 3"]);
        match result {
            Err(Error::ToolFailed { stderr, .. }) => assert_eq!(stderr, "oops"),
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_kills_child() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let started = Instant::now();

        let result = runner.run(Path::new("sleep"), &["5"]);

        assert!(matches!(result, Err(Error::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_abort_reaps_child() {
        let mut child = Command::new("sleep")
            .arg("5")
            .spawn()
            .expect("Failed to spawn sleep");

        abort(&mut child);

        let status = child.try_wait().expect("try_wait failed");
        assert!(matches!(status, Some(s) if !s.success()));
    }

    #[test]
    fn test_timeout_covers_background_descendant() {
        // The shell exits at once, but `sleep` inherits and holds stdout.
        let runner = SystemRunner::new(Duration::from_millis(200));
        let started = Instant::now();

        let result = runner.run(Path::new("sh"), &["-c", "sleep 6 & echo tcp LISTEN"]);

        assert!(matches!(result, Err(Error::Timeout { .. })), "got {:?}", result);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
