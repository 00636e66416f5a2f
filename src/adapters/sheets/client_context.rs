use std::{future::Future, sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt};
use tracing::{info, instrument};

use crate::adapters::cache::TtlCache;
use crate::adapters::config::sheets_config::SheetsConfig;
use crate::ports::tabular_store::Result;

use super::spreadsheet_manager::SpreadsheetManager;

type Connector<C> = Box<dyn Fn() -> BoxFuture<'static, Result<C>> + Send + Sync>;

/// Owns the authenticated spreadsheet client for the whole process.
///
/// The client is built on first use, shared until it is `ttl` old and rebuilt
/// after that or after `invalidate`.
pub struct ClientContext<C = SpreadsheetManager> {
    cache: TtlCache<Arc<C>>,
    connect: Connector<C>,
}

impl<C> std::fmt::Debug for ClientContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext").finish_non_exhaustive()
    }
}

impl ClientContext<SpreadsheetManager> {
    pub fn new(config: SheetsConfig) -> Self {
        let ttl = config.client_ttl();
        let config = Arc::new(config);
        Self::with_connector(ttl, move || {
            let config = Arc::clone(&config);
            async move { SpreadsheetManager::new(&config).await }
        })
    }
}

impl<C: Send + Sync + 'static> ClientContext<C> {
    pub fn with_connector<F, Fut>(ttl: Duration, connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C>> + Send + 'static,
    {
        Self {
            cache: TtlCache::new(ttl),
            connect: Box::new(move || connect().boxed()),
        }
    }

    #[instrument(name = "ClientContext::get_client", skip(self))]
    pub async fn get_client(&self) -> Result<Arc<C>> {
        self.cache
            .get_or_try_init(|| async move {
                info!("Building spreadsheet client");
                (self.connect)().await.map(Arc::new)
            })
            .await
    }

    /// Drops the cached client; the next `get_client` builds a new one.
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tabular_store::SheetStoreError;
    use error_stack::report;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_context(ttl: Duration) -> (ClientContext<usize>, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let context = ClientContext::with_connector(ttl, move || {
            let counter = Arc::clone(&counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });
        (context, builds)
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_is_reused_within_ttl() {
        let (context, builds) = counting_context(Duration::from_secs(3600));

        let first = context.get_client().await.unwrap();
        tokio::time::advance(Duration::from_secs(1800)).await;
        let second = context.get_client().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_is_rebuilt_after_ttl() {
        let (context, builds) = counting_context(Duration::from_secs(3600));

        assert_eq!(*context.get_client().await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(*context.get_client().await.unwrap(), 2);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let (context, _) = counting_context(Duration::from_secs(3600));
        assert_eq!(*context.get_client().await.unwrap(), 1);
        context.invalidate().await;
        assert_eq!(*context.get_client().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_build_failure_is_returned_and_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let context = ClientContext::<()>::with_connector(Duration::from_secs(3600), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(report!(SheetStoreError::Authentication))
            }
        });

        for _ in 0..2 {
            let err = context.get_client().await.unwrap_err();
            assert_eq!(err.current_context(), &SheetStoreError::Authentication);
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
