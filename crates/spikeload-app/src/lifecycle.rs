//! 라이프사이클 관리.
//!
//! 종료 신호 채널과 OS 시그널 처리.

use spikeload_core::error::CoreError;
use tokio::sync::watch;
use tracing::info;

/// 종료 신호 브로드캐스터
pub struct Lifecycle {
    shutdown_tx: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// 종료 수신기 발급
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 종료 신호 발송
    pub fn shutdown(&self) {
        info!("종료 신호 발송");
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// OS 시그널 대기 (SIGINT, SIGTERM / Ctrl+C) 후 종료 신호 발송
    pub async fn wait_for_signal(&self) -> Result<(), CoreError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            tokio::select! {
                _ = sigint.recv() => info!("SIGINT 수신"),
                _ = sigterm.recv() => info!("SIGTERM 수신"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C 수신");
        }

        self.shutdown();
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let lifecycle = Lifecycle::new();
        let rx = lifecycle.subscribe();
        assert!(!*rx.borrow());
        assert!(!lifecycle.is_shutting_down());
    }

    #[test]
    fn shutdown_without_subscribers() {
        let lifecycle = Lifecycle::new();
        lifecycle.shutdown();
        assert!(lifecycle.is_shutting_down());
    }

    #[tokio::test]
    async fn subscribers_observe_shutdown() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();

        lifecycle.shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
