//! Article use-cases: CRUD, lifecycle transitions, likes, delegated edit
//! access, and the cached listings.
//!
//! Every privileged operation goes through the policy table before touching
//! the repository, and every successful write synchronously invalidates the
//! enumerable cache keys the article can stale.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::article::{Article, ArticleDraft, ArticleEdit};
use super::error::DomainError;
use super::identity::Principal;
use super::policy::{self, Action, ArticleRef, DomainScope, Target};
use super::ports::cache_key::{self, ARTICLES_TTL_SECS};
use super::ports::{
    ArticleRepository, DomainRepository, NewArticleRecord, PublicArticleFilter, UserRepository,
};
use super::read_model::CachedReads;
use super::role::Role;

/// Article use-cases over the persistence and cache ports.
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    users: Arc<dyn UserRepository>,
    domains: Arc<dyn DomainRepository>,
    reads: CachedReads,
}

fn article_ref(article: &Article) -> ArticleRef {
    ArticleRef {
        domain_id: article.domain_id,
        author_id: article.author_id,
        editors: article.editors.clone(),
    }
}

fn scope_filter(scope: DomainScope) -> Option<Option<i32>> {
    match scope {
        DomainScope::All => Some(None),
        DomainScope::Domain(domain_id) => Some(Some(domain_id)),
        DomainScope::Nothing => None,
    }
}

impl ArticleService {
    /// Assemble the service over its ports.
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        users: Arc<dyn UserRepository>,
        domains: Arc<dyn DomainRepository>,
        reads: CachedReads,
    ) -> Self {
        Self {
            articles,
            users,
            domains,
            reads,
        }
    }

    /// The article repository, shared with the retention sweep.
    pub fn repository(&self) -> Arc<dyn ArticleRepository> {
        Arc::clone(&self.articles)
    }

    /// The read-model handle, shared with the retention sweep.
    pub fn reads(&self) -> CachedReads {
        self.reads.clone()
    }

    /// Published articles for anonymous readers, served through the cache.
    pub async fn list_public(
        &self,
        filter: PublicArticleFilter,
    ) -> Result<Vec<Article>, DomainError> {
        let key = cache_key::public_articles(
            filter.domain_id,
            filter.query.as_deref(),
            filter.limit,
            filter.offset,
        );
        self.reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self.articles.list_public(&filter).await?)
            })
            .await
    }

    /// One published article for anonymous readers.
    ///
    /// Pending, archived, and rejected articles are indistinguishable from
    /// nonexistent ones here.
    pub async fn get_public(&self, id: i32) -> Result<Article, DomainError> {
        let key = cache_key::article_item(id);
        let found: Option<Article> = self
            .reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self
                    .articles
                    .find(id)
                    .await?
                    .filter(|article| article.status().is_public()))
            })
            .await?;
        found.ok_or_else(|| DomainError::not_found("article not found"))
    }

    /// Every article in the caller's scope, any status.
    pub async fn list_admin(&self, principal: &Principal) -> Result<Vec<Article>, DomainError> {
        policy::authorize(principal, Action::ViewAdminArticles, &Target::None)?;
        let Some(domain_filter) = scope_filter(policy::listing_scope(principal)) else {
            return Ok(Vec::new());
        };
        let key = cache_key::admin_articles(domain_filter);
        self.reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self
                    .articles
                    .list_all(policy::listing_scope(principal))
                    .await?)
            })
            .await
    }

    /// The caller's own authored articles.
    pub async fn list_own(&self, principal: &Principal) -> Result<Vec<Article>, DomainError> {
        policy::authorize(principal, Action::ViewOwnArticles, &Target::None)?;
        let key = cache_key::contributor_articles(principal.user_id);
        self.reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self.articles.list_by_author(principal.user_id).await?)
            })
            .await
    }

    /// Archived articles in the caller's scope.
    pub async fn list_archived(&self, principal: &Principal) -> Result<Vec<Article>, DomainError> {
        policy::authorize(principal, Action::ViewArchivedArticles, &Target::None)?;
        let Some(domain_filter) = scope_filter(policy::listing_scope(principal)) else {
            return Ok(Vec::new());
        };
        let key = cache_key::archived_articles(domain_filter);
        self.reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self
                    .articles
                    .list_archived(policy::listing_scope(principal))
                    .await?)
            })
            .await
    }

    /// Articles awaiting validation in the caller's scope.
    pub async fn list_pending(&self, principal: &Principal) -> Result<Vec<Article>, DomainError> {
        policy::authorize(principal, Action::ViewPendingArticles, &Target::None)?;
        let Some(domain_filter) = scope_filter(policy::listing_scope(principal)) else {
            return Ok(Vec::new());
        };
        let key = cache_key::pending_articles(domain_filter);
        self.reads
            .get_or_load(&key, ARTICLES_TTL_SECS, || async {
                Ok(self
                    .articles
                    .list_pending(policy::listing_scope(principal))
                    .await?)
            })
            .await
    }

    /// Create an article.
    ///
    /// Domain-scoped authors land in their own domain regardless of the
    /// request; contributors enter the pending state, admin-tier authors
    /// publish immediately.
    pub async fn create(
        &self,
        principal: &Principal,
        draft: ArticleDraft,
        requested_domain: Option<i32>,
        date: Option<DateTime<Utc>>,
    ) -> Result<Article, DomainError> {
        policy::authorize(principal, Action::CreateArticle, &Target::None)?;
        let domain_id = policy::resolve_create_domain(principal, requested_domain)?;
        if self.domains.find(domain_id).await?.is_none() {
            return Err(DomainError::invalid_request("unknown domain"));
        }
        let record = NewArticleRecord {
            title: draft.title().to_owned(),
            content: draft.content().to_owned(),
            domain_id,
            author_id: principal.user_id,
            date: date.unwrap_or_else(Utc::now),
            pending_validation: !principal.role.is_admin_tier(),
        };
        let article = self.articles.insert(&record).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    /// Edit content fields. Status flags are never writable here.
    pub async fn update(
        &self,
        principal: &Principal,
        id: i32,
        edit: ArticleEdit,
    ) -> Result<Article, DomainError> {
        let mut article = self.load(id).await?;
        policy::authorize(principal, Action::EditArticle, &Target::Article(&article_ref(&article)))?;
        if article.archived && !principal.role.is_admin_tier() {
            return Err(DomainError::forbidden("archived articles cannot be edited"));
        }
        let edit = edit.validated()?;
        if let Some(title) = edit.title {
            article.title = title;
        }
        if let Some(content) = edit.content {
            article.content = content;
        }
        if let Some(date) = edit.date {
            article.date = date;
        }
        self.articles.save(&article).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    /// Delete an article; its likes cascade at the schema level.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), DomainError> {
        let article = self.load(id).await?;
        policy::authorize(
            principal,
            Action::DeleteArticle,
            &Target::Article(&article_ref(&article)),
        )?;
        self.articles.delete(id).await?;
        self.invalidate_for(&article).await;
        Ok(())
    }

    /// Flip the archived bit.
    pub async fn toggle_archive(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<Article, DomainError> {
        let mut article = self.load(id).await?;
        policy::authorize(
            principal,
            Action::ToggleArchive,
            &Target::Article(&article_ref(&article)),
        )?;
        article.toggle_archive();
        self.articles.save(&article).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    /// Approve a pending article for publication.
    pub async fn validate(&self, principal: &Principal, id: i32) -> Result<Article, DomainError> {
        let mut article = self.load(id).await?;
        policy::authorize(
            principal,
            Action::ValidateArticle,
            &Target::Article(&article_ref(&article)),
        )?;
        article.approve(principal.user_id, Utc::now())?;
        self.articles.save(&article).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    /// Decline a pending article.
    pub async fn reject(&self, principal: &Principal, id: i32) -> Result<Article, DomainError> {
        let mut article = self.load(id).await?;
        policy::authorize(
            principal,
            Action::RejectArticle,
            &Target::Article(&article_ref(&article)),
        )?;
        article.decline()?;
        self.articles.save(&article).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    /// Register an anonymous like for a published article.
    ///
    /// One like per address; a repeat request is an idempotent success
    /// reporting the unchanged count.
    pub async fn like(&self, id: i32, ip_address: &str) -> Result<i32, DomainError> {
        let article = self.load(id).await?;
        if !article.status().is_public() {
            return Err(DomainError::not_found("article not found"));
        }
        let outcome = self.articles.add_like(id, ip_address).await?;
        if outcome.newly_added {
            self.invalidate_for(&article).await;
        }
        Ok(outcome.likes_count)
    }

    /// Grant delegated edit access to a contributor by email.
    pub async fn grant_edit(
        &self,
        principal: &Principal,
        id: i32,
        editor_email: &str,
    ) -> Result<Article, DomainError> {
        let mut article = self.load(id).await?;
        policy::authorize(
            principal,
            Action::GrantEditAccess,
            &Target::Article(&article_ref(&article)),
        )?;
        let editor = self
            .users
            .find_credentials(editor_email)
            .await?
            .ok_or_else(|| DomainError::not_found("no contributor with this email"))?;
        if editor.account.role != Role::Contributor {
            return Err(DomainError::not_found("no contributor with this email"));
        }
        article.grant_edit(editor_email);
        self.articles.save(&article).await?;
        self.invalidate_for(&article).await;
        Ok(article)
    }

    async fn load(&self, id: i32) -> Result<Article, DomainError> {
        self.articles
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("article not found"))
    }

    async fn invalidate_for(&self, article: &Article) {
        let keys =
            cache_key::article_invalidation_set(article.id, article.domain_id, article.author_id);
        self.reads.invalidate(&keys).await;
    }
}

#[cfg(test)]
mod tests {
    //! Lifecycle, authorization, and cache-interaction coverage.
    use rstest::rstest;

    use super::*;
    use crate::domain::article::{fixtures as articles, ArticleStatus};
    use crate::domain::domains::Domain;
    use crate::domain::identity::fixtures as principals;
    use crate::domain::ports::article_repository::fixtures::InMemoryArticleRepository;
    use crate::domain::ports::domain_repository::fixtures::InMemoryDomainRepository;
    use crate::domain::ports::user_repository::fixtures::InMemoryUserRepository;
    use crate::domain::read_model::fixtures::InMemoryCacheStore;
    use crate::domain::ErrorCode;

    struct Harness {
        service: ArticleService,
        repo: Arc<InMemoryArticleRepository>,
        cache: Arc<InMemoryCacheStore>,
    }

    fn harness(repo: InMemoryArticleRepository, users: InMemoryUserRepository) -> Harness {
        let repo = Arc::new(repo);
        let cache = Arc::new(InMemoryCacheStore::default());
        let domains = InMemoryDomainRepository::default()
            .with_domain(Domain {
                id: 16,
                name: "Engineering".to_owned(),
                color: "#1976d2".to_owned(),
            })
            .with_domain(Domain {
                id: 17,
                name: "HR".to_owned(),
                color: "#d32f2f".to_owned(),
            });
        let service = ArticleService::new(
            Arc::clone(&repo) as Arc<dyn ArticleRepository>,
            Arc::new(users),
            Arc::new(domains),
            CachedReads::new(Arc::clone(&cache) as Arc<dyn crate::domain::ports::CacheStore>),
        );
        Harness {
            service,
            repo,
            cache,
        }
    }

    fn default_harness() -> Harness {
        harness(
            InMemoryArticleRepository::default(),
            InMemoryUserRepository::default(),
        )
    }

    fn draft() -> ArticleDraft {
        ArticleDraft::new("Launch update", "We shipped.").expect("valid draft")
    }

    #[rstest]
    #[tokio::test]
    async fn contributor_creation_enters_pending_in_their_own_domain() {
        let h = default_harness();
        let author = principals::contributor(5, 16);
        // The requested domain is silently overridden.
        let article = h
            .service
            .create(&author, draft(), Some(17), None)
            .await
            .expect("creation succeeds");
        assert_eq!(article.domain_id, 16);
        assert_eq!(article.status(), ArticleStatus::Pending);
        assert_eq!(article.author_id, 5);
    }

    #[rstest]
    #[tokio::test]
    async fn admin_tier_creation_publishes_immediately() {
        let h = default_harness();
        let article = h
            .service
            .create(&principals::domain_admin(16), draft(), None, None)
            .await
            .expect("creation succeeds");
        assert_eq!(article.status(), ArticleStatus::Published);
    }

    #[rstest]
    #[tokio::test]
    async fn super_admin_creation_requires_an_explicit_domain() {
        let h = default_harness();
        let err = h
            .service
            .create(&principals::super_admin(), draft(), None, None)
            .await
            .expect_err("missing domain rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn creation_into_an_unknown_domain_is_rejected() {
        let h = default_harness();
        let err = h
            .service
            .create(&principals::super_admin(), draft(), Some(99), None)
            .await
            .expect_err("unknown domain rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn edits_respect_authorship_and_delegation() {
        let mut article = articles::published(1, 16, 5);
        article.editors.push("writer6@example.com".to_owned());
        let h = harness(
            InMemoryArticleRepository::default().with_article(article),
            InMemoryUserRepository::default(),
        );
        let edit = ArticleEdit {
            title: Some("Amended".to_owned()),
            ..ArticleEdit::default()
        };

        // A delegated editor may edit.
        let updated = h
            .service
            .update(&principals::contributor(6, 16), 1, edit.clone())
            .await
            .expect("delegated edit succeeds");
        assert_eq!(updated.title, "Amended");

        // An unrelated contributor in the same domain may not.
        let err = h
            .service
            .update(&principals::contributor(7, 16), 1, edit)
            .await
            .expect_err("unrelated contributor rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn contributors_cannot_edit_archived_articles() {
        let mut article = articles::published(1, 16, 5);
        article.archived = true;
        let h = harness(
            InMemoryArticleRepository::default().with_article(article),
            InMemoryUserRepository::default(),
        );
        let err = h
            .service
            .update(
                &principals::contributor(5, 16),
                1,
                ArticleEdit {
                    title: Some("Too late".to_owned()),
                    ..ArticleEdit::default()
                },
            )
            .await
            .expect_err("archived article locked for the author");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn double_toggle_restores_the_original_state() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::published(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let admin = principals::domain_admin(16);
        let toggled = h
            .service
            .toggle_archive(&admin, 1)
            .await
            .expect("toggle succeeds");
        assert_eq!(toggled.status(), ArticleStatus::Archived);
        let restored = h
            .service
            .toggle_archive(&admin, 1)
            .await
            .expect("second toggle succeeds");
        assert_eq!(restored.status(), ArticleStatus::Published);
    }

    #[rstest]
    #[tokio::test]
    async fn validation_publishes_and_stamps_the_validator() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::pending(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let admin = principals::domain_admin(16);
        let validated = h.service.validate(&admin, 1).await.expect("validates");
        assert_eq!(validated.status(), ArticleStatus::Published);
        assert_eq!(validated.validated_by, Some(admin.user_id));
        assert!(validated.validated_at.is_some());

        // Now visible publicly.
        let public = h.service.get_public(1).await.expect("published article");
        assert_eq!(public.id, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn rejection_parks_the_article_in_the_rejected_state() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::pending(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let rejected = h
            .service
            .reject(&principals::super_admin(), 1)
            .await
            .expect("rejects");
        assert_eq!(rejected.status(), ArticleStatus::Rejected);
    }

    #[rstest]
    #[tokio::test]
    async fn lateral_domain_admin_transitions_are_forbidden() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::pending(1, 17, 5)),
            InMemoryUserRepository::default(),
        );
        let err = h
            .service
            .validate(&principals::domain_admin(16), 1)
            .await
            .expect_err("lateral validation rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn pending_listing_is_domain_segregated() {
        let h = harness(
            InMemoryArticleRepository::default()
                .with_article(articles::pending(1, 16, 5))
                .with_article(articles::pending(2, 17, 6)),
            InMemoryUserRepository::default(),
        );
        let own = h
            .service
            .list_pending(&principals::domain_admin(16))
            .await
            .expect("listing succeeds");
        assert_eq!(own.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);

        let all = h
            .service
            .list_pending(&principals::super_admin())
            .await
            .expect("listing succeeds");
        assert_eq!(all.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn unassigned_domain_admin_sees_empty_listings() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::published(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let mut admin = principals::domain_admin(16);
        admin.domain_id = None;
        let listed = h.service.list_admin(&admin).await.expect("listing succeeds");
        assert!(listed.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn public_reads_hide_non_published_articles() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::pending(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let err = h.service.get_public(1).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn repeat_likes_from_one_address_are_idempotent() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::published(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        assert_eq!(h.service.like(1, "10.0.0.9").await.expect("first like"), 1);
        assert_eq!(h.service.like(1, "10.0.0.9").await.expect("repeat like"), 1);
        assert_eq!(h.service.like(1, "10.0.0.10").await.expect("new address"), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn grant_edit_requires_an_existing_contributor() {
        let editor = InMemoryUserRepository::account(6, Role::Contributor, Some(16));
        let reader = InMemoryUserRepository::account(9, Role::User, None);
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::published(1, 16, 5)),
            InMemoryUserRepository::default()
                .with_user(editor, "x")
                .with_user(reader, "x"),
        );
        let author = principals::contributor(5, 16);

        let granted = h
            .service
            .grant_edit(&author, 1, "user6@example.com")
            .await
            .expect("grant succeeds");
        assert!(granted.editors.contains(&"user6@example.com".to_owned()));

        let err = h
            .service
            .grant_edit(&author, 1, "user9@example.com")
            .await
            .expect_err("non-contributor rejected");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = h
            .service
            .grant_edit(&author, 1, "ghost@example.com")
            .await
            .expect_err("unknown email rejected");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn paginated_public_listings_cache_under_their_own_keys() {
        let h = harness(
            InMemoryArticleRepository::default()
                .with_article(articles::published(1, 16, 5))
                .with_article(articles::published(2, 16, 5)),
            InMemoryUserRepository::default(),
        );

        // A limit-only page warms its own key, not the unfiltered one.
        let page = h
            .service
            .list_public(PublicArticleFilter {
                limit: Some(1),
                ..PublicArticleFilter::default()
            })
            .await
            .expect("paginated listing succeeds");
        assert_eq!(page.len(), 1);
        assert!(h.cache.contains(&cache_key::public_articles(None, None, Some(1), None)));
        assert!(!h.cache.contains(&cache_key::public_articles(None, None, None, None)));

        let full = h
            .service
            .list_public(PublicArticleFilter::default())
            .await
            .expect("unfiltered listing succeeds");
        assert_eq!(full.len(), 2);

        // Offset-only shapes are distinct too.
        let rest = h
            .service
            .list_public(PublicArticleFilter {
                offset: Some(1),
                ..PublicArticleFilter::default()
            })
            .await
            .expect("offset listing succeeds");
        assert_eq!(rest.len(), 1);
        assert!(h.cache.contains(&cache_key::public_articles(None, None, None, Some(1))));
    }

    #[rstest]
    #[tokio::test]
    async fn writes_invalidate_the_cached_listings() {
        let h = harness(
            InMemoryArticleRepository::default().with_article(articles::published(1, 16, 5)),
            InMemoryUserRepository::default(),
        );
        let admin = principals::domain_admin(16);

        // Warm the admin listing and the public item.
        h.service.list_admin(&admin).await.expect("listing succeeds");
        h.service.get_public(1).await.expect("read succeeds");
        assert!(h.cache.contains(&cache_key::admin_articles(Some(16))));
        assert!(h.cache.contains(&cache_key::article_item(1)));

        h.service
            .update(
                &admin,
                1,
                ArticleEdit {
                    title: Some("Amended".to_owned()),
                    ..ArticleEdit::default()
                },
            )
            .await
            .expect("update succeeds");

        assert!(!h.cache.contains(&cache_key::admin_articles(Some(16))));
        assert!(!h.cache.contains(&cache_key::article_item(1)));

        // The next public read reflects the write.
        let reread = h.service.get_public(1).await.expect("read succeeds");
        assert_eq!(reread.title, "Amended");
        assert_eq!(h.repo.snapshot(1).map(|a| a.title), Some("Amended".to_owned()));
    }
}
