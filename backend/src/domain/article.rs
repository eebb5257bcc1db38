//! Article entity and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Lifecycle state of an article.
///
/// Persisted as two flags (`pending_validation`, `archived`); every flag
/// combination maps to exactly one named state, so the formerly accidental
/// pending-and-archived combination is first-class here as [`Rejected`].
///
/// [`Rejected`]: ArticleStatus::Rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Publicly visible.
    Published,
    /// Awaiting validation by a domain admin.
    Pending,
    /// Hidden from public listings; restorable.
    Archived,
    /// Declined during validation.
    Rejected,
}

impl ArticleStatus {
    /// Derive the status from the persisted flag pair.
    pub fn from_flags(pending_validation: bool, archived: bool) -> Self {
        match (pending_validation, archived) {
            (false, false) => Self::Published,
            (true, false) => Self::Pending,
            (false, true) => Self::Archived,
            (true, true) => Self::Rejected,
        }
    }

    /// The persisted `(pending_validation, archived)` flag pair.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Published => (false, false),
            Self::Pending => (true, false),
            Self::Archived => (false, true),
            Self::Rejected => (true, true),
        }
    }

    /// Whether anonymous readers may see an article in this state.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Published)
    }
}

/// A newsletter article.
///
/// ## Invariants
/// - `title` and `content` are non-blank.
/// - `author_id` is fixed at creation and never reassigned.
/// - `validated_by`/`validated_at` are set together, only by a validation
///   transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Persisted id.
    pub id: i32,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Owning domain.
    pub domain_id: i32,
    /// Owning domain's display name, resolved at read time.
    pub domain_name: String,
    /// Fixed author.
    pub author_id: i32,
    /// Author's display name, resolved at read time.
    pub author_name: String,
    /// Publication date.
    pub date: DateTime<Utc>,
    /// Emails holding delegated edit access.
    pub editors: Vec<String>,
    /// Denormalised like counter.
    pub likes_count: i32,
    /// Archived flag.
    pub archived: bool,
    /// Awaiting-validation flag.
    pub pending_validation: bool,
    /// Validator's user id, once validated.
    pub validated_by: Option<i32>,
    /// Validation timestamp, set with `validated_by`.
    pub validated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Current lifecycle state.
    pub fn status(&self) -> ArticleStatus {
        ArticleStatus::from_flags(self.pending_validation, self.archived)
    }

    /// Approve a pending article for publication.
    ///
    /// Only `Pending` articles can be validated; anything else is a state
    /// conflict surfaced to the caller.
    pub fn approve(&mut self, validator_id: i32, at: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status() != ArticleStatus::Pending {
            return Err(DomainError::conflict("article is not awaiting validation"));
        }
        self.pending_validation = false;
        self.validated_by = Some(validator_id);
        self.validated_at = Some(at);
        Ok(())
    }

    /// Decline a pending article.
    pub fn decline(&mut self) -> Result<(), DomainError> {
        if self.status() != ArticleStatus::Pending {
            return Err(DomainError::conflict("article is not awaiting validation"));
        }
        self.archived = true;
        Ok(())
    }

    /// Flip the archived bit: `Published <-> Archived`, `Pending <-> Rejected`.
    ///
    /// Toggling twice always restores the original state.
    pub fn toggle_archive(&mut self) {
        self.archived = !self.archived;
    }

    /// Grant delegated edit access to an email address. Idempotent.
    pub fn grant_edit(&mut self, email: &str) {
        if !self.editors.iter().any(|e| e == email) {
            self.editors.push(email.to_owned());
        }
    }
}

/// Validated content fields for a new article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    title: String,
    content: String,
}

impl ArticleDraft {
    /// Validate the draft fields.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        let content = content.into();
        if title.trim().is_empty() {
            return Err(DomainError::invalid_request("title must not be empty"));
        }
        if content.trim().is_empty() {
            return Err(DomainError::invalid_request("content must not be empty"));
        }
        Ok(Self { title, content })
    }

    /// Headline.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Content-field edit. Status flags are never writable through an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleEdit {
    /// Replacement headline, when present.
    pub title: Option<String>,
    /// Replacement body, when present.
    pub content: Option<String>,
    /// Replacement publication date, when present.
    pub date: Option<DateTime<Utc>>,
}

impl ArticleEdit {
    /// Whether the edit changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.date.is_none()
    }

    /// Reject blank replacement fields.
    pub fn validated(self) -> Result<Self, DomainError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DomainError::invalid_request("title must not be empty"));
        }
        if self.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(DomainError::invalid_request("content must not be empty"));
        }
        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::fixtures;
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, ArticleStatus::Published)]
    #[case(true, false, ArticleStatus::Pending)]
    #[case(false, true, ArticleStatus::Archived)]
    #[case(true, true, ArticleStatus::Rejected)]
    fn every_flag_pair_has_a_named_status(
        #[case] pending: bool,
        #[case] archived: bool,
        #[case] expected: ArticleStatus,
    ) {
        let status = ArticleStatus::from_flags(pending, archived);
        assert_eq!(status, expected);
        assert_eq!(status.flags(), (pending, archived));
    }

    #[rstest]
    fn approve_moves_pending_to_published() {
        let mut article = fixtures::pending(1, 16, 5);
        let at = Utc::now();
        article.approve(7, at).expect("pending article validates");
        assert_eq!(article.status(), ArticleStatus::Published);
        assert_eq!(article.validated_by, Some(7));
        assert_eq!(article.validated_at, Some(at));
    }

    #[rstest]
    #[case(ArticleStatus::Published)]
    #[case(ArticleStatus::Archived)]
    #[case(ArticleStatus::Rejected)]
    fn approve_rejects_non_pending_states(#[case] status: ArticleStatus) {
        let mut article = fixtures::published(1, 16, 5);
        (article.pending_validation, article.archived) = status.flags();
        let err = article
            .approve(7, Utc::now())
            .expect_err("only pending articles validate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    fn decline_moves_pending_to_rejected() {
        let mut article = fixtures::pending(1, 16, 5);
        article.decline().expect("pending article declines");
        assert_eq!(article.status(), ArticleStatus::Rejected);
        assert_eq!(article.validated_by, None);
    }

    #[rstest]
    #[case(ArticleStatus::Published, ArticleStatus::Archived)]
    #[case(ArticleStatus::Archived, ArticleStatus::Published)]
    #[case(ArticleStatus::Pending, ArticleStatus::Rejected)]
    #[case(ArticleStatus::Rejected, ArticleStatus::Pending)]
    fn toggle_archive_flips_and_double_toggle_restores(
        #[case] from: ArticleStatus,
        #[case] to: ArticleStatus,
    ) {
        let mut article = fixtures::published(1, 16, 5);
        (article.pending_validation, article.archived) = from.flags();
        article.toggle_archive();
        assert_eq!(article.status(), to);
        article.toggle_archive();
        assert_eq!(article.status(), from);
    }

    #[rstest]
    fn grant_edit_is_idempotent() {
        let mut article = fixtures::published(1, 16, 5);
        article.grant_edit("writer6@example.com");
        article.grant_edit("writer6@example.com");
        assert_eq!(article.editors, vec!["writer6@example.com".to_owned()]);
    }

    #[rstest]
    #[case("", "body")]
    #[case("  ", "body")]
    #[case("title", "")]
    fn draft_rejects_blank_fields(#[case] title: &str, #[case] content: &str) {
        let err = ArticleDraft::new(title, content).expect_err("blank fields rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn edit_rejects_blank_replacements() {
        let edit = ArticleEdit {
            title: Some("   ".to_owned()),
            ..ArticleEdit::default()
        };
        let err = edit.validated().expect_err("blank title rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
