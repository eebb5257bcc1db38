//! Domain use-cases: CRUD plus the cached listing.

use std::sync::Arc;

use super::domains::{Domain, DomainDraft};
use super::error::DomainError;
use super::identity::Principal;
use super::policy::{self, Action, DomainRef, Target};
use super::ports::cache_key::{self, DOMAINS_TTL_SECS};
use super::ports::{CacheKey, DomainRepository};
use super::read_model::CachedReads;

/// Domain use-cases over the persistence and cache ports.
pub struct DomainService {
    domains: Arc<dyn DomainRepository>,
    reads: CachedReads,
}

impl DomainService {
    /// Assemble the service over its ports.
    pub fn new(domains: Arc<dyn DomainRepository>, reads: CachedReads) -> Self {
        Self { domains, reads }
    }

    /// All domains, served through the cache. Readable by anyone.
    pub async fn list(&self) -> Result<Vec<Domain>, DomainError> {
        self.reads
            .get_or_load(&cache_key::all_domains(), DOMAINS_TTL_SECS, || async {
                Ok(self.domains.list().await?)
            })
            .await
    }

    /// Create a domain.
    pub async fn create(
        &self,
        principal: &Principal,
        draft: DomainDraft,
    ) -> Result<Domain, DomainError> {
        policy::authorize(principal, Action::CreateDomain, &Target::None)?;
        let domain = self.domains.insert(&draft).await?;
        self.reads.invalidate(&[cache_key::all_domains()]).await;
        Ok(domain)
    }

    /// Rename or recolour a domain.
    pub async fn update(
        &self,
        principal: &Principal,
        id: i32,
        draft: DomainDraft,
    ) -> Result<Domain, DomainError> {
        policy::authorize(principal, Action::UpdateDomain, &Target::Domain(DomainRef { id }))?;
        let updated = self
            .domains
            .update(id, &draft)
            .await?
            .ok_or_else(|| DomainError::not_found("domain not found"))?;
        self.reads.invalidate(&[cache_key::all_domains()]).await;
        Ok(updated)
    }

    /// Delete a domain; its articles cascade away with it.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), DomainError> {
        policy::authorize(principal, Action::DeleteDomain, &Target::Domain(DomainRef { id }))?;
        if !self.domains.delete(id).await? {
            return Err(DomainError::not_found("domain not found"));
        }
        self.reads.invalidate(&deletion_keys(id)).await;
        Ok(())
    }
}

/// A domain deletion stales the domain listing and every enumerable article
/// listing that may have carried its rows.
fn deletion_keys(domain_id: i32) -> Vec<CacheKey> {
    vec![
        cache_key::all_domains(),
        cache_key::public_articles(None, None, None, None),
        cache_key::public_articles(Some(domain_id), None, None, None),
        cache_key::admin_articles(None),
        cache_key::admin_articles(Some(domain_id)),
        cache_key::archived_articles(None),
        cache_key::archived_articles(Some(domain_id)),
        cache_key::pending_articles(None),
        cache_key::pending_articles(Some(domain_id)),
    ]
}

#[cfg(test)]
mod tests {
    //! Authorization and invalidation coverage for domain management.
    use rstest::rstest;

    use super::*;
    use crate::domain::identity::fixtures as principals;
    use crate::domain::ports::domain_repository::fixtures::InMemoryDomainRepository;
    use crate::domain::ports::CacheStore;
    use crate::domain::read_model::fixtures::InMemoryCacheStore;
    use crate::domain::ErrorCode;

    fn service_with(
        repo: InMemoryDomainRepository,
    ) -> (DomainService, Arc<InMemoryCacheStore>) {
        let cache = Arc::new(InMemoryCacheStore::default());
        let service = DomainService::new(
            Arc::new(repo),
            CachedReads::new(Arc::clone(&cache) as Arc<dyn CacheStore>),
        );
        (service, cache)
    }

    fn engineering() -> Domain {
        Domain {
            id: 16,
            name: "Engineering".to_owned(),
            color: "#1976d2".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn created_domains_appear_in_the_next_listing() {
        let (service, cache) = service_with(InMemoryDomainRepository::default());
        let admin = principals::super_admin();

        // Warm an empty listing first so the create must invalidate it.
        assert!(service.list().await.expect("listing succeeds").is_empty());
        assert!(cache.contains(&cache_key::all_domains()));

        let draft = DomainDraft::new("Engineering", None).expect("valid draft");
        service.create(&admin, draft).await.expect("create succeeds");

        let listed = service.list().await.expect("listing succeeds");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Engineering");
    }

    #[rstest]
    #[case(principals::domain_admin(16), ErrorCode::Forbidden)]
    #[case(principals::contributor(5, 16), ErrorCode::Forbidden)]
    #[tokio::test]
    async fn creation_is_super_admin_only(
        #[case] principal: crate::domain::identity::Principal,
        #[case] expected: ErrorCode,
    ) {
        let (service, _) = service_with(InMemoryDomainRepository::default());
        let draft = DomainDraft::new("Engineering", None).expect("valid draft");
        let err = service.create(&principal, draft).await.expect_err("rejected");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn domain_admin_updates_only_their_own_domain() {
        let (service, _) = service_with(
            InMemoryDomainRepository::default()
                .with_domain(engineering())
                .with_domain(Domain {
                    id: 17,
                    name: "HR".to_owned(),
                    color: "#d32f2f".to_owned(),
                }),
        );
        let admin = principals::domain_admin(16);
        let draft = DomainDraft::new("Platform", Some("#00695c".to_owned())).expect("valid");

        let updated = service
            .update(&admin, 16, draft.clone())
            .await
            .expect("own-domain update succeeds");
        assert_eq!(updated.name, "Platform");

        let err = service
            .update(&admin, 17, draft)
            .await
            .expect_err("lateral update rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn deletion_requires_an_existing_domain() {
        let (service, _) = service_with(InMemoryDomainRepository::default());
        let err = service
            .delete(&principals::super_admin(), 42)
            .await
            .expect_err("missing domain");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn deletion_stales_article_listings_too() {
        let (service, cache) = service_with(
            InMemoryDomainRepository::default().with_domain(engineering()),
        );
        cache.seed(&cache_key::admin_articles(Some(16)), "[]");
        cache.seed(&cache_key::public_articles(None, None, None, None), "[]");

        service
            .delete(&principals::super_admin(), 16)
            .await
            .expect("delete succeeds");

        assert!(!cache.contains(&cache_key::admin_articles(Some(16))));
        assert!(!cache.contains(&cache_key::public_articles(None, None, None, None)));
    }
}
