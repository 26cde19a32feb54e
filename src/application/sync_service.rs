//! Remote reconciliation.
//!
//! Pulls the remote list and installs it in place of local quotes
//! (remote wins, no per-record comparison). Failures leave local data
//! untouched and surface only as a failed `SyncOutcome`.

use tokio::sync::broadcast;

use crate::domain::{map_remote_posts, QuoteRecord, SyncError, SyncOutcome, SyncPhase};
use crate::infrastructure::RemoteSource;

use super::quote_store::QuoteStore;

/// Buffered outcomes per subscriber before it starts lagging.
const OUTCOME_CHANNEL_CAPACITY: usize = 16;

/// Drives sync attempts against a remote source and fans out their outcomes.
pub struct SyncCoordinator<R> {
    remote: R,
    phase: SyncPhase,
    last_outcome: Option<SyncOutcome>,
    outcomes: broadcast::Sender<SyncOutcome>,
}

impl<R: RemoteSource> SyncCoordinator<R> {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new(remote: R) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            remote,
            phase: SyncPhase::Idle,
            last_outcome: None,
            outcomes,
        }
    }

    /// Receive every outcome emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncOutcome> {
        self.outcomes.subscribe()
    }

    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    #[must_use]
    pub const fn last_outcome(&self) -> Option<&SyncOutcome> {
        self.last_outcome.as_ref()
    }

    /// Run one sync attempt against `store`.
    ///
    /// Never fails: errors are folded into the returned outcome, which is
    /// also broadcast to subscribers.
    pub async fn sync(&mut self, store: &mut QuoteStore) -> SyncOutcome {
        self.phase = SyncPhase::Syncing;
        tracing::info!("Starting sync...");

        let outcome = match self.fetch_remote_quotes().await {
            Ok(quotes) => {
                let applied = quotes.len();
                store.replace_all(quotes);
                tracing::info!(applied, "Sync completed");
                SyncOutcome::success(applied)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sync failed, keeping local quotes");
                SyncOutcome::failure(&e)
            }
        };

        self.phase = SyncPhase::Idle;
        self.last_outcome = Some(outcome.clone());
        // No subscribers is fine
        let _ = self.outcomes.send(outcome.clone());

        outcome
    }

    async fn fetch_remote_quotes(&self) -> Result<Vec<QuoteRecord>, SyncError> {
        let posts = self.remote.fetch().await?;
        tracing::debug!(received = posts.len(), "Fetched remote posts");
        map_remote_posts(posts)
    }

    /// Best-effort push of one quote. Returns whether the remote accepted it.
    pub async fn push(&self, quote: &QuoteRecord) -> bool {
        match self.remote.push(quote).await {
            Ok(()) => {
                tracing::info!(id = quote.id, "Quote posted to server");
                true
            }
            Err(e) => {
                tracing::warn!(id = quote.id, error = %e, "Failed to post quote");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{default_quotes, RemotePost};
    use crate::infrastructure::MemoryKvStore;

    type FetchResult = Result<Vec<RemotePost>, SyncError>;

    /// Remote double that replays scripted fetch results and records pushes.
    #[derive(Default)]
    struct ScriptedRemote {
        fetches: Mutex<VecDeque<FetchResult>>,
        pushed: Arc<Mutex<Vec<QuoteRecord>>>,
        reject_push: bool,
    }

    impl ScriptedRemote {
        fn with(results: Vec<FetchResult>) -> Self {
            Self {
                fetches: Mutex::new(results.into()),
                ..Default::default()
            }
        }
    }

    impl RemoteSource for ScriptedRemote {
        async fn fetch(&self) -> FetchResult {
            self.fetches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SyncError::Network("script exhausted".into())))
        }

        async fn push(&self, quote: &QuoteRecord) -> Result<(), SyncError> {
            if self.reject_push {
                return Err(SyncError::Status(500));
            }
            self.pushed.lock().unwrap().push(quote.clone());
            Ok(())
        }
    }

    /// Remote whose fetch never completes.
    struct StalledRemote;

    impl RemoteSource for StalledRemote {
        async fn fetch(&self) -> FetchResult {
            std::future::pending().await
        }

        async fn push(&self, _quote: &QuoteRecord) -> Result<(), SyncError> {
            std::future::pending().await
        }
    }

    fn post(id: i64, title: &str) -> RemotePost {
        RemotePost {
            id,
            title: title.into(),
        }
    }

    fn store() -> QuoteStore {
        QuoteStore::open(Arc::new(MemoryKvStore::new()), Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn test_remote_replaces_local() {
        let mut store = store();
        let mut coordinator = SyncCoordinator::new(ScriptedRemote::with(vec![Ok(vec![post(
            9, "Hello",
        )])]));

        let outcome = coordinator.sync(&mut store).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.applied_count, 1);
        assert_eq!(
            store.repository().all(),
            &[QuoteRecord {
                id: 9,
                text: "Hello".into(),
                category: "Server".into(),
            }]
        );
        assert_eq!(store.index().categories(), vec!["all", "Server"]);
        assert_eq!(coordinator.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_dropped_sync_leaves_local_untouched() {
        let mut store = store();
        let mut coordinator = SyncCoordinator::new(StalledRemote);
        let mut outcomes = coordinator.subscribe();

        let interrupted = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            coordinator.sync(&mut store),
        )
        .await;

        assert!(interrupted.is_err());
        assert_eq!(store.repository().all(), default_quotes().as_slice());
        assert!(coordinator.last_outcome().is_none());
        assert!(outcomes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_local() {
        let mut store = store();
        let mut coordinator = SyncCoordinator::new(ScriptedRemote::with(vec![Err(
            SyncError::Network("connection refused".into()),
        )]));

        let outcome = coordinator.sync(&mut store).await;

        assert!(!outcome.succeeded);
        assert!(outcome.error.unwrap().contains("connection refused"));
        assert_eq!(store.repository().all(), default_quotes().as_slice());
        assert_eq!(coordinator.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_malformed_payload_keeps_local() {
        let mut store = store();
        let mut coordinator =
            SyncCoordinator::new(ScriptedRemote::with(vec![Ok(vec![post(1, "")])]));

        let outcome = coordinator.sync(&mut store).await;

        assert!(!outcome.succeeded);
        assert_eq!(store.repository().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_not_sticky() {
        let mut store = store();
        let mut coordinator = SyncCoordinator::new(ScriptedRemote::with(vec![
            Err(SyncError::Status(503)),
            Ok(vec![post(1, "back online")]),
        ]));

        assert!(!coordinator.sync(&mut store).await.succeeded);
        assert!(coordinator.sync(&mut store).await.succeeded);
        assert_eq!(store.repository().len(), 1);
        assert!(coordinator.last_outcome().is_some_and(|o| o.succeeded));
    }

    #[tokio::test]
    async fn test_sync_drops_filter_and_local_adds() {
        let mut store = store();
        store.add("local only", "Mine").unwrap();
        store.set_filter("Mine").unwrap();

        let mut coordinator =
            SyncCoordinator::new(ScriptedRemote::with(vec![Ok(vec![post(2, "remote")])]));
        coordinator.sync(&mut store).await;

        assert!(store
            .repository()
            .all()
            .iter()
            .all(|q| q.category == "Server"));
        assert_eq!(store.index().current_filter(), "all");
    }

    #[tokio::test]
    async fn test_outcomes_are_broadcast() {
        let mut store = store();
        let mut coordinator = SyncCoordinator::new(ScriptedRemote::with(vec![
            Ok(vec![post(1, "a"), post(2, "b")]),
            Err(SyncError::Malformed("not an array".into())),
        ]));
        let mut rx = coordinator.subscribe();

        coordinator.sync(&mut store).await;
        coordinator.sync(&mut store).await;

        let first = rx.try_recv().unwrap();
        assert!(first.succeeded);
        assert_eq!(first.applied_count, 2);

        let second = rx.try_recv().unwrap();
        assert!(!second.succeeded);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_reports_acceptance() {
        let remote = ScriptedRemote::default();
        let pushed = Arc::clone(&remote.pushed);
        let coordinator = SyncCoordinator::new(remote);
        let quote = default_quotes().remove(0);

        assert!(coordinator.push(&quote).await);
        assert_eq!(pushed.lock().unwrap().as_slice(), &[quote]);
    }

    #[tokio::test]
    async fn test_push_failure_is_best_effort() {
        let coordinator = SyncCoordinator::new(ScriptedRemote {
            reject_push: true,
            ..Default::default()
        });
        let mut store = store();
        let quote = store.add("x", "y").unwrap();

        assert!(!coordinator.push(&quote).await);
        assert_eq!(store.repository().get(quote.id), Some(&quote));
    }
}
