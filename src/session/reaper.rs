//! Periodic removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;
use crate::session::SessionStore;

pub struct SessionReaper {
    store: Arc<dyn SessionStore>,
    interval: Duration,
}

impl SessionReaper {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Session reaper starting");

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session reaper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Purge expired sessions once.
    pub async fn sweep(&self) {
        match self.store.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Purged expired sessions"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
        }
        if let Ok(count) = self.store.count().await {
            metrics::record_active_sessions(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::Data;
    use crate::session::{MemoryStore, SessionId};
    use std::time::SystemTime;

    #[tokio::test]
    async fn test_sweep_purges_expired() {
        let store = Arc::new(MemoryStore::new());
        let past = SystemTime::now() - Duration::from_secs(1);
        store.save(&SessionId::generate(), Data::new(), past).await.unwrap();

        let reaper = SessionReaper::new(store.clone(), Duration::from_secs(60));
        reaper.sweep().await;
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let reaper = SessionReaper::new(store, Duration::from_millis(10));
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(reaper.run(rx));
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper did not stop")
            .unwrap();
    }
}
