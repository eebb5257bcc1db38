//! Domain entity: the content category partition of the platform.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A content domain (e.g. Engineering, HR).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Persisted id.
    pub id: i32,
    /// Unique display name.
    pub name: String,
    /// Display colour, as a CSS hex string.
    pub color: String,
}

/// Validated fields for creating or renaming a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDraft {
    name: String,
    color: String,
}

const DEFAULT_COLOR: &str = "#1976d2";

impl DomainDraft {
    /// Validate the draft fields. A missing colour falls back to the default.
    pub fn new(name: impl Into<String>, color: Option<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_request("domain name must not be empty"));
        }
        Ok(Self {
            name,
            color: color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display colour.
    pub fn color(&self) -> &str {
        &self.color
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn draft_defaults_the_colour() {
        let draft = DomainDraft::new("Engineering", None).expect("valid draft");
        assert_eq!(draft.color(), DEFAULT_COLOR);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn draft_rejects_blank_names(#[case] name: &str) {
        let err = DomainDraft::new(name, None).expect_err("blank name rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
