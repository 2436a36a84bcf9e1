use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use tokio::process::{Child, Command};
use tokio::time::{self, Instant};

use crate::domain::{ChunkOutcome, TransferTool, UploadOutcome};
use crate::rclone::{error::RcloneError, interrupt::Interrupts};
use crate::utils::constants::{EXIT_SETUP_ERROR, INTERRUPT_GRACE};

/// Runs the real rclone binary as a child process
#[derive(Debug, Clone)]
pub struct Rclone {
    binary: String,
}

enum WaitEvent {
    Exited(std::io::Result<ExitStatus>),
    Deadline,
    Interrupt,
}

impl Rclone {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> RcloneError {
        match source.kind() {
            ErrorKind::NotFound => RcloneError::ToolNotFound {
                binary: self.binary.clone(),
            },
            _ => RcloneError::SpawnError {
                binary: self.binary.clone(),
                source,
            },
        }
    }

    fn wait_error(&self, source: std::io::Error) -> RcloneError {
        RcloneError::WaitError {
            binary: self.binary.clone(),
            source,
        }
    }
}

#[async_trait]
impl TransferTool for Rclone {
    fn program(&self) -> &str {
        &self.binary
    }

    async fn run_bounded(&self, args: &[String], limit: Duration) -> Result<ChunkOutcome, RcloneError> {
        let mut interrupts = Interrupts::listen();
        let deadline = Instant::now() + limit;
        let mut child = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let event = tokio::select! {
            biased;
            _ = interrupts.recv() => WaitEvent::Interrupt,
            status = child.wait() => WaitEvent::Exited(status),
            _ = time::sleep_until(deadline) => WaitEvent::Deadline,
        };

        match event {
            WaitEvent::Exited(status) => {
                let outcome = classify(status.map_err(|e| self.wait_error(e))?);
                // Ctrl+C reaches rclone and us together; rclone may exit first
                if matches!(outcome, ChunkOutcome::Failed(_))
                    && interrupts.received_within(INTERRUPT_GRACE).await
                {
                    return Ok(ChunkOutcome::Interrupted);
                }
                Ok(outcome)
            }
            WaitEvent::Deadline => {
                info!(
                    "Rclone process timed out after {} seconds (as scheduled), stopping it",
                    limit.as_secs()
                );
                child.kill().await.map_err(|e| self.wait_error(e))?;
                Ok(ChunkOutcome::TimedOut)
            }
            WaitEvent::Interrupt => {
                info!("Interrupt received, forwarding it to rclone and waiting for it to finish");
                if let Err(e) = forward_interrupt(&mut child) {
                    warn!("Could not forward the interrupt to rclone: {}", e);
                }
                self.finish_interrupted(&mut child, &mut interrupts, deadline)
                    .await?;
                Ok(ChunkOutcome::Interrupted)
            }
        }
    }

    async fn run_captured(&self, args: &[String], limit: Duration) -> Result<UploadOutcome, RcloneError> {
        let mut interrupts = Interrupts::listen();
        let mut command = Command::new(&self.binary);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let result = tokio::select! {
            biased;
            _ = interrupts.recv() => {
                info!("Interrupt received, abandoning the log upload");
                return Ok(UploadOutcome::Interrupted);
            }
            result = time::timeout(limit, command.output()) => result,
        };

        match result {
            Err(_elapsed) => Ok(UploadOutcome::TimedOut),
            Ok(Err(e)) => Err(self.spawn_error(e)),
            Ok(Ok(output)) if output.status.success() => Ok(UploadOutcome::Uploaded),
            Ok(Ok(output)) => Ok(UploadOutcome::Failed {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

impl Rclone {
    /// Give an interrupted rclone the rest of the run duration to shut down.
    /// A second interrupt or the deadline kills it.
    async fn finish_interrupted(
        &self,
        child: &mut Child,
        interrupts: &mut Interrupts,
        deadline: Instant,
    ) -> Result<(), RcloneError> {
        let kill = tokio::select! {
            biased;
            _ = interrupts.recv() => {
                info!("Second interrupt received, stopping rclone now");
                true
            }
            status = child.wait() => {
                status.map_err(|e| self.wait_error(e))?;
                false
            }
            _ = time::sleep_until(deadline) => {
                info!("Run duration elapsed while rclone was shutting down, stopping it");
                true
            }
        };
        if kill {
            child.kill().await.map_err(|e| self.wait_error(e))?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn forward_interrupt(child: &mut Child) -> std::io::Result<()> {
    if let Some(pid) = child.id() {
        // SAFETY: plain kill(2) on the pid of a child we still own
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn forward_interrupt(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

/// Map a finished child to an outcome. A child killed by SIGINT counts as
/// interrupted; any other signal as a failure with code `128 + signal`.
fn classify(status: ExitStatus) -> ChunkOutcome {
    if let Some(code) = status.code() {
        return ChunkOutcome::from_code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ChunkOutcome::from_code(128 + signal);
        }
    }
    ChunkOutcome::Failed(EXIT_SETUP_ERROR)
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::PathBuf;
    use std::time::Instant;

    use tempfile::TempDir;
    use tokio::sync::{Mutex, MutexGuard};

    use super::*;

    // SIGINT is process-wide: a test raising it must not reach another test's child
    static REAL_CHILDREN: Mutex<()> = Mutex::const_new(());

    async fn exclusive() -> MutexGuard<'static, ()> {
        REAL_CHILDREN.lock().await
    }

    /// Run a shell script standing in for rclone. The script goes through
    /// `/bin/sh` so it never has to be executable.
    struct FakeRclone {
        dir: TempDir,
        script: String,
        tool: Rclone,
    }

    impl FakeRclone {
        fn new(body: &str) -> Self {
            let dir = TempDir::new().unwrap();
            let script = dir.path().join("fake-rclone.sh");
            std::fs::write(&script, format!("{body}\n")).unwrap();
            Self {
                script: script.to_string_lossy().into_owned(),
                dir,
                tool: Rclone::new("/bin/sh"),
            }
        }

        /// Fake rclone that installs `trap`, records its pid, then runs `body`
        fn with_pid_file(trap: &str, body: &str) -> (Self, PathBuf) {
            let dir = TempDir::new().unwrap();
            let pid_file = dir.path().join("rclone.pid");
            let script = dir.path().join("fake-rclone.sh");
            let trap = trap.replace("$DIR", &dir.path().display().to_string());
            let text = format!("{trap}\necho $$ > '{}'\n{body}\n", pid_file.display());
            std::fs::write(&script, text).unwrap();
            let fake = Self {
                script: script.to_string_lossy().into_owned(),
                dir,
                tool: Rclone::new("/bin/sh"),
            };
            (fake, pid_file)
        }

        fn file(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn args(&self, extra: &[&str]) -> Vec<String> {
            std::iter::once(self.script.as_str())
                .chain(extra.iter().copied())
                .map(String::from)
                .collect()
        }

        async fn run_bounded(&self, limit: Duration) -> ChunkOutcome {
            self.tool.run_bounded(&self.args(&[]), limit).await.unwrap()
        }

        async fn run_captured(&self, limit: Duration) -> UploadOutcome {
            self.tool.run_captured(&self.args(&[]), limit).await.unwrap()
        }
    }

    /// Press Ctrl+C `presses` times once the child is up: SIGINT goes to the
    /// child and to this process, as a terminal delivers it to both.
    fn ctrl_c(pid_file: PathBuf, presses: usize) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let pid = loop {
                if let Ok(text) = tokio::fs::read_to_string(&pid_file).await {
                    if let Ok(pid) = text.trim().parse::<libc::pid_t>() {
                        break pid;
                    }
                }
                time::sleep(Duration::from_millis(20)).await;
            };
            for _ in 0..presses {
                // SAFETY: kill(2) on our own child and on ourselves
                unsafe {
                    libc::kill(pid, libc::SIGINT);
                    libc::kill(libc::getpid(), libc::SIGINT);
                }
                time::sleep(Duration::from_millis(300)).await;
            }
        })
    }

    #[tokio::test]
    async fn exit_zero_is_completed() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("exit 0");
        assert_eq!(ChunkOutcome::Completed, fake.run_bounded(Duration::from_secs(10)).await);
    }

    #[tokio::test]
    async fn tool_error_code_is_passed_through() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("exit 7");
        let outcome = fake.run_bounded(Duration::from_secs(10)).await;
        assert_eq!(ChunkOutcome::Failed(7), outcome);
        assert_eq!(7, outcome.exit_status());
    }

    #[tokio::test]
    async fn deadline_kills_the_child() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("exec sleep 30");
        let started = Instant::now();
        let outcome = fake.run_bounded(Duration::from_secs(1)).await;
        assert_eq!(ChunkOutcome::TimedOut, outcome);
        assert_eq!(0, outcome.exit_status());
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn missing_binary_is_tool_not_found() {
        let _guard = exclusive().await;
        let rclone = Rclone::new("/nonexistent/definitely-not-rclone");
        let result = rclone.run_bounded(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RcloneError::ToolNotFound { .. })));

        let result = rclone.run_captured(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RcloneError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn arguments_reach_the_child_verbatim() {
        let _guard = exclusive().await;
        let record = TempDir::new().unwrap();
        let record = record.path().join("args.txt");
        let fake = FakeRclone::new(&format!("printf '%s\\n' \"$@\" > '{}'", record.display()));
        let args = fake.args(&["copy", "gd:My Photos; echo pwned", "$HOME"]);
        fake.tool.run_bounded(&args, Duration::from_secs(10)).await.unwrap();

        let recorded = std::fs::read_to_string(&record).unwrap();
        assert_eq!("copy\ngd:My Photos; echo pwned\n$HOME\n", recorded);
    }

    #[tokio::test]
    async fn captured_failure_keeps_output() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("echo out; echo err >&2; exit 3");
        assert_eq!(
            UploadOutcome::Failed {
                code: Some(3),
                stdout: "out".to_string(),
                stderr: "err".to_string(),
            },
            fake.run_captured(Duration::from_secs(10)).await
        );
    }

    #[tokio::test]
    async fn captured_success_and_timeout() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("echo done");
        assert_eq!(UploadOutcome::Uploaded, fake.run_captured(Duration::from_secs(10)).await);

        let slow = FakeRclone::new("exec sleep 30");
        assert_eq!(UploadOutcome::TimedOut, slow.run_captured(Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn child_killed_by_signal_is_classified() {
        let _guard = exclusive().await;
        let fake = FakeRclone::new("kill -INT $$");
        assert_eq!(ChunkOutcome::Interrupted, fake.run_bounded(Duration::from_secs(10)).await);

        let fake = FakeRclone::new("kill -TERM $$");
        assert_eq!(
            ChunkOutcome::Failed(128 + libc::SIGTERM),
            fake.run_bounded(Duration::from_secs(10)).await
        );
    }

    #[tokio::test]
    async fn ctrl_c_wins_over_the_exit_it_causes() {
        let _guard = exclusive().await;
        for _ in 0..5 {
            let (fake, pid_file) = FakeRclone::with_pid_file(
                "trap 'echo stopped > \"$DIR/trapped\"; exit 1' INT",
                "while :; do sleep 0.1; done",
            );
            let presses = ctrl_c(pid_file, 1);
            let outcome = fake.run_bounded(Duration::from_secs(30)).await;
            presses.await.unwrap();

            assert_eq!(ChunkOutcome::Interrupted, outcome);
            assert_eq!(0, outcome.exit_status());
            assert!(fake.file("trapped").exists());
        }
    }

    #[tokio::test]
    async fn interrupted_child_is_still_bound_by_the_deadline() {
        let _guard = exclusive().await;
        let (fake, pid_file) = FakeRclone::with_pid_file("trap '' INT", "exec sleep 30");
        let presses = ctrl_c(pid_file, 1);
        let started = Instant::now();
        let outcome = fake.run_bounded(Duration::from_secs(2)).await;
        presses.await.unwrap();

        assert_eq!(ChunkOutcome::Interrupted, outcome);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn second_ctrl_c_kills_the_child() {
        let _guard = exclusive().await;
        let (fake, pid_file) = FakeRclone::with_pid_file("trap '' INT", "exec sleep 30");
        let presses = ctrl_c(pid_file, 2);
        let started = Instant::now();
        let outcome = fake.run_bounded(Duration::from_secs(60)).await;
        presses.await.unwrap();

        assert_eq!(ChunkOutcome::Interrupted, outcome);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn ctrl_c_abandons_captured_run() {
        let _guard = exclusive().await;
        let (fake, pid_file) = FakeRclone::with_pid_file("trap '' INT", "exec sleep 30");
        let presses = ctrl_c(pid_file, 1);
        let started = Instant::now();
        let outcome = fake.run_captured(Duration::from_secs(60)).await;
        presses.await.unwrap();

        assert_eq!(UploadOutcome::Interrupted, outcome);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn program_is_the_configured_binary() {
        assert_eq!("/usr/local/bin/rclone", Rclone::new("/usr/local/bin/rclone").program());
    }
}
