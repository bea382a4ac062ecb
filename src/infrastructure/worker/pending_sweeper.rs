//! Pending Sweeper - 定期清理过期的多轮指令状态

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::PendingStorePort;

pub struct PendingSweeper {
    store: Arc<dyn PendingStorePort>,
    interval: Duration,
}

impl PendingSweeper {
    pub fn new(store: Arc<dyn PendingStorePort>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// 运行直到 shutdown 被取消
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "PendingSweeper started");

        let mut ticker = tokio::time::interval(self.interval);
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let purged = self.store.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged = purged, remaining = self.store.len(), "Expired pending commands purged");
                    }
                }
            }
        }

        tracing::info!("PendingSweeper stopped");
    }
}
