//! Stops the daemon on SIGINT/SIGTERM.
//!
//! The trigger is a `tokio::sync::watch` flag, so a waiter that subscribes
//! after the signal still sees it.

use std::future::Future;

use tokio::signal;
use tokio::sync::watch;

pub struct ShutdownController {
    flag: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag }
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once [`ShutdownController::trigger`] has been called, including
    /// when that happened before this call.
    pub fn notified(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.flag.subscribe();
        async move {
            // An error means the controller is gone; nothing will ever trigger.
            if rx.wait_for(|stopped| *stopped).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    /// Block until the process is asked to stop, then trigger.
    pub async fn trigger_on_signal(&self) {
        #[cfg(unix)]
        let sigterm = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        let signal_name = tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "cannot listen for SIGINT");
                }
                "SIGINT"
            }
            _ = sigterm => "SIGTERM",
        };
        tracing::info!(signal = signal_name, "stopping procura daemon");
        self.trigger();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn trigger_wakes_waiters() {
        let controller = ShutdownController::new();
        let waiter = tokio::spawn(controller.notified());
        assert!(!controller.is_triggered());
        controller.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter did not wake")
            .unwrap();
    }

    #[tokio::test]
    async fn late_waiters_see_earlier_trigger() {
        let controller = ShutdownController::new();
        controller.trigger();
        tokio::time::timeout(Duration::from_secs(1), controller.notified())
            .await
            .expect("trigger was missed");
        assert!(controller.is_triggered());
    }
}
