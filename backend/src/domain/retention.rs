//! Daily retention sweep: published articles past the retention window are
//! archived automatically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use super::error::DomainError;
use super::ports::{cache_key, ArticleRepository, CacheKey};
use super::read_model::CachedReads;

/// Default retention window for published articles, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Run one archival sweep and invalidate the listings it may have staled.
///
/// Idempotent: already-archived rows are untouched, so back-to-back runs
/// archive nothing new.
pub async fn sweep_once(
    articles: &Arc<dyn ArticleRepository>,
    reads: &CachedReads,
    retention_days: i64,
) -> Result<u64, DomainError> {
    let cutoff = Utc::now() - chrono::Duration::days(retention_days);
    let archived = articles.archive_older_than(cutoff).await?;
    if archived > 0 {
        info!(archived, retention_days, "retention sweep archived articles");
        // Per-domain variants are left to their TTL; the sweep does not know
        // which domains were touched.
        reads.invalidate(&sweep_keys()).await;
    }
    Ok(archived)
}

fn sweep_keys() -> Vec<CacheKey> {
    vec![
        cache_key::public_articles(None, None, None, None),
        cache_key::admin_articles(None),
        cache_key::archived_articles(None),
    ]
}

/// Spawn the daily sweep loop. The first sweep runs immediately on start so
/// a service that restarts rarely still enforces the window.
pub fn spawn_sweep(
    articles: Arc<dyn ArticleRepository>,
    reads: CachedReads,
    retention_days: i64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_once(&articles, &reads, retention_days).await {
                error!(error = %err, "retention sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    //! Sweep behaviour coverage.
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::article::fixtures as articles_fixtures;
    use crate::domain::article::ArticleStatus;
    use crate::domain::ports::article_repository::fixtures::InMemoryArticleRepository;
    use crate::domain::ports::CacheStore;
    use crate::domain::read_model::fixtures::InMemoryCacheStore;

    #[rstest]
    #[tokio::test]
    async fn sweep_archives_only_stale_published_articles() {
        let mut fresh = articles_fixtures::published(1, 16, 5);
        fresh.date = Utc::now();
        let mut stale = articles_fixtures::published(2, 16, 5);
        stale.date = Utc::now() - chrono::Duration::days(45);
        let mut stale_pending = articles_fixtures::pending(3, 16, 5);
        stale_pending.date = Utc::now() - chrono::Duration::days(45);

        let repo = Arc::new(
            InMemoryArticleRepository::default()
                .with_article(fresh)
                .with_article(stale)
                .with_article(stale_pending),
        );
        let reads =
            CachedReads::new(Arc::new(InMemoryCacheStore::default()) as Arc<dyn CacheStore>);

        let articles: Arc<dyn ArticleRepository> = Arc::clone(&repo) as _;
        let archived = sweep_once(&articles, &reads, 30).await.expect("sweep runs");
        assert_eq!(archived, 1);
        assert_eq!(
            repo.snapshot(2).map(|a| a.status()),
            Some(ArticleStatus::Archived)
        );
        // Pending articles are not published; the sweep leaves them alone.
        assert_eq!(
            repo.snapshot(3).map(|a| a.status()),
            Some(ArticleStatus::Pending)
        );

        // Idempotent on the second pass.
        let archived = sweep_once(&articles, &reads, 30).await.expect("sweep runs");
        assert_eq!(archived, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn sweep_invalidates_the_broad_listings() {
        let mut stale = articles_fixtures::published(1, 16, 5);
        stale.date = Utc::now() - chrono::Duration::days(45);
        let repo = Arc::new(InMemoryArticleRepository::default().with_article(stale));
        let cache = Arc::new(InMemoryCacheStore::default());
        cache.seed(&cache_key::public_articles(None, None, None, None), "[]");
        let reads = CachedReads::new(Arc::clone(&cache) as Arc<dyn CacheStore>);

        let articles: Arc<dyn ArticleRepository> = repo as _;
        sweep_once(&articles, &reads, 30).await.expect("sweep runs");
        assert!(!cache.contains(&cache_key::public_articles(None, None, None, None)));
    }
}
