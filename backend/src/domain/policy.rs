//! Declarative authorization policy.
//!
//! A single role x action table maps every privileged operation to a
//! [`Scope`], and [`authorize`] applies the scope predicate against the
//! target resource. Every service consults this module instead of encoding
//! its own role conditionals, so the edit check and the delete check for the
//! same resource can never drift apart.
//!
//! Domain-scoped roles (`contributor`, `domain_admin`) never gain lateral
//! access: whatever the table grants them is still confined to resources
//! whose `domain_id` matches their own.

use super::error::DomainError;
use super::identity::Principal;
use super::role::Role;

/// Privileged operations known to the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create an article (target domain resolved separately, see
    /// [`resolve_create_domain`]).
    CreateArticle,
    /// Edit an article's content fields.
    EditArticle,
    /// Delete an article permanently.
    DeleteArticle,
    /// Flip an article's archived bit.
    ToggleArchive,
    /// Approve a pending article for publication.
    ValidateArticle,
    /// Reject a pending article.
    RejectArticle,
    /// Add a delegated editor to an article.
    GrantEditAccess,
    /// List every article visible to an admin tier.
    ViewAdminArticles,
    /// List the caller's own authored articles.
    ViewOwnArticles,
    /// List archived articles.
    ViewArchivedArticles,
    /// List articles awaiting validation.
    ViewPendingArticles,
    /// Create a domain.
    CreateDomain,
    /// Update a domain's name or colour.
    UpdateDomain,
    /// Delete a domain (cascades its articles).
    DeleteDomain,
    /// List user accounts.
    ListUsers,
    /// Create a user account.
    CreateUser,
    /// Update a user account.
    UpdateUser,
    /// Delete a user account.
    DeleteUser,
    /// Read the login/logout audit log.
    ViewAuditLog,
    /// List newsletter subscribers.
    ListSubscribers,
    /// Remove a newsletter subscription.
    DeleteSubscriber,
}

/// Scope predicate attached to a granted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Unrestricted.
    Any,
    /// Target must live in the principal's own domain.
    OwnDomain,
    /// Admin tier within scope, the author, or a delegated editor.
    OwnArticle,
    /// The principal's own account, or an account in their domain.
    SelfOrDomain,
    /// Never permitted for this role.
    Denied,
}

/// Attributes of an article relevant to authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    /// Domain the article belongs to.
    pub domain_id: i32,
    /// Fixed author id.
    pub author_id: i32,
    /// Delegated editor emails.
    pub editors: Vec<String>,
}

/// Attributes of a domain relevant to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainRef {
    /// Domain id.
    pub id: i32,
}

/// Attributes of a user account relevant to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRef {
    /// Account id.
    pub id: i32,
    /// Account's assigned domain, if any.
    pub domain_id: Option<i32>,
}

/// Resource the action is aimed at. `None` for listing actions, where the
/// caller narrows results with [`listing_scope`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    /// No concrete resource (listings, creates).
    None,
    /// An article.
    Article(&'a ArticleRef),
    /// A domain.
    Domain(DomainRef),
    /// A user account.
    User(UserRef),
}

/// Row-filtering scope for listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainScope {
    /// Unfiltered, across all domains.
    All,
    /// Rows whose `domain_id` matches.
    Domain(i32),
    /// No rows (a scoped role with no domain assigned).
    Nothing,
}

/// The policy table: what scope does `role` get for `action`?
pub fn grant(role: Role, action: Action) -> Scope {
    use Action::*;
    use Role::*;
    match (role, action) {
        (
            SuperAdmin,
            CreateDomain | DeleteDomain | CreateUser | DeleteUser | ViewAuditLog
            | ListSubscribers | DeleteSubscriber,
        ) => Scope::Any,
        (
            _,
            CreateDomain | DeleteDomain | CreateUser | DeleteUser | ViewAuditLog
            | ListSubscribers | DeleteSubscriber,
        ) => Scope::Denied,

        (SuperAdmin, UpdateDomain) => Scope::Any,
        (DomainAdmin, UpdateDomain) => Scope::OwnDomain,
        (_, UpdateDomain) => Scope::Denied,

        (SuperAdmin, ListUsers) => Scope::Any,
        (DomainAdmin, ListUsers) => Scope::OwnDomain,
        (_, ListUsers) => Scope::Denied,

        (SuperAdmin, UpdateUser) => Scope::Any,
        (DomainAdmin | Contributor | User, UpdateUser) => Scope::SelfOrDomain,

        (SuperAdmin, CreateArticle) => Scope::Any,
        (DomainAdmin | Contributor, CreateArticle) => Scope::OwnDomain,
        (User, CreateArticle) => Scope::Denied,

        (SuperAdmin, EditArticle | DeleteArticle | GrantEditAccess) => Scope::Any,
        (DomainAdmin | Contributor, EditArticle | DeleteArticle | GrantEditAccess) => {
            Scope::OwnArticle
        }
        (User, EditArticle | DeleteArticle | GrantEditAccess) => Scope::Denied,

        (SuperAdmin, ToggleArchive | ValidateArticle | RejectArticle) => Scope::Any,
        (DomainAdmin, ToggleArchive | ValidateArticle | RejectArticle) => Scope::OwnDomain,
        (_, ToggleArchive | ValidateArticle | RejectArticle) => Scope::Denied,

        (SuperAdmin, ViewAdminArticles | ViewArchivedArticles | ViewPendingArticles) => Scope::Any,
        (DomainAdmin, ViewAdminArticles | ViewArchivedArticles | ViewPendingArticles) => {
            Scope::OwnDomain
        }
        (_, ViewAdminArticles | ViewArchivedArticles | ViewPendingArticles) => Scope::Denied,

        (SuperAdmin | DomainAdmin | Contributor, ViewOwnArticles) => Scope::Any,
        (User, ViewOwnArticles) => Scope::Denied,
    }
}

/// Apply the granted scope to a concrete target.
///
/// Returns `Forbidden` whenever the predicate fails; listing actions with
/// `Target::None` succeed for any non-`Denied` scope and are narrowed by
/// [`listing_scope`] afterwards.
pub fn authorize(
    principal: &Principal,
    action: Action,
    target: &Target<'_>,
) -> Result<(), DomainError> {
    let scope = grant(principal.role, action);
    let permitted = match (scope, target) {
        (Scope::Denied, _) => false,
        (Scope::Any, _) => true,
        (_, Target::None) => true,
        (Scope::OwnDomain, Target::Article(article)) => principal.is_assigned_to(article.domain_id),
        (Scope::OwnDomain, Target::Domain(domain)) => principal.is_assigned_to(domain.id),
        (Scope::OwnDomain, Target::User(user)) => {
            user.domain_id.is_some_and(|id| principal.is_assigned_to(id))
        }
        (Scope::OwnArticle, Target::Article(article)) => {
            owns_article(principal, article)
                || (principal.role.is_admin_tier()
                    && principal.is_assigned_to(article.domain_id))
        }
        (Scope::SelfOrDomain, Target::User(user)) => {
            user.id == principal.user_id
                || (principal.role == Role::DomainAdmin
                    && user.domain_id.is_some_and(|id| principal.is_assigned_to(id)))
        }
        // Scope/target shape mismatch is a programming error; fail closed.
        _ => false,
    };
    if permitted {
        Ok(())
    } else {
        Err(DomainError::forbidden("insufficient permissions"))
    }
}

/// Whether the principal authored the article or holds delegated edit access.
pub fn owns_article(principal: &Principal, article: &ArticleRef) -> bool {
    article.author_id == principal.user_id
        || article.editors.iter().any(|email| email == &principal.email)
}

/// Row filter applied to admin-tier listing endpoints.
pub fn listing_scope(principal: &Principal) -> DomainScope {
    match principal.role {
        Role::SuperAdmin => DomainScope::All,
        Role::DomainAdmin | Role::Contributor => principal
            .domain_id
            .map_or(DomainScope::Nothing, DomainScope::Domain),
        Role::User => DomainScope::Nothing,
    }
}

/// Resolve the target domain for a new article.
///
/// Domain-scoped authors have any requested domain silently overridden to
/// their own assignment; a super admin must name one explicitly.
pub fn resolve_create_domain(
    principal: &Principal,
    requested: Option<i32>,
) -> Result<i32, DomainError> {
    match principal.role {
        Role::Contributor | Role::DomainAdmin => principal
            .domain_id
            .ok_or_else(|| DomainError::forbidden("no domain assigned")),
        Role::SuperAdmin => requested
            .ok_or_else(|| DomainError::invalid_request("a target domain is required")),
        Role::User => Err(DomainError::forbidden("insufficient permissions")),
    }
}
