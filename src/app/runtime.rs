use super::SceneSession;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

impl SceneSession {
    /// Cancel the session on SIGINT, or SIGTERM on Unix
    pub fn cancel_on_signals(&self) {
        let token = self.cancellation_token();

        #[cfg(unix)]
        {
            let token = token.clone();
            tokio::spawn(async move {
                let mut sigterm =
                    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                        Ok(sigterm) => sigterm,
                        Err(e) => {
                            warn!("Failed to register SIGTERM handler: {}", e);
                            return;
                        }
                    };
                wait_or_cancelled(&token, async {
                    if sigterm.recv().await.is_some() {
                        info!("Received SIGTERM signal");
                    }
                })
                .await;
            });
        }

        tokio::spawn(async move {
            wait_or_cancelled(&token, async {
                if let Ok(()) = signal::ctrl_c().await {
                    info!("Received SIGINT signal (Ctrl+C)");
                }
            })
            .await;
        });
    }
}

/// Run `signal` and cancel `token` once it resolves; give up quietly if the
/// token is cancelled first
async fn wait_or_cancelled<F>(token: &CancellationToken, signal: F)
where
    F: std::future::Future<Output = ()>,
{
    tokio::select! {
        _ = token.cancelled() => {}
        _ = signal => token.cancel(),
    }
}
