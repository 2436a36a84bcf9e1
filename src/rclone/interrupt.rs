use std::time::Duration;

use log::warn;
use tokio::time;

/// Operator interrupts (SIGINT / Ctrl+C) observed while a child runs.
///
/// Created before the child is spawned so an interrupt that reaches both
/// processes at once is never missed.
pub struct Interrupts {
    #[cfg(unix)]
    inner: Option<tokio::signal::unix::Signal>,
    #[cfg(windows)]
    inner: Option<tokio::signal::windows::CtrlC>,
}

impl Interrupts {
    pub fn listen() -> Self {
        #[cfg(unix)]
        let inner = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt());
        #[cfg(windows)]
        let inner = tokio::signal::windows::ctrl_c();

        let inner = match inner {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("Could not listen for Ctrl+C: {}", e);
                None
            }
        };
        Self { inner }
    }

    /// Resolves on the next interrupt, never if listening is impossible
    pub async fn recv(&mut self) {
        if let Some(listener) = self.inner.as_mut() {
            if listener.recv().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Whether an interrupt arrived already or arrives within `grace`
    pub async fn received_within(&mut self, grace: Duration) -> bool {
        time::timeout(grace, self.recv()).await.is_ok()
    }
}
