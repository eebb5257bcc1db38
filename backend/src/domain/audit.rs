//! Append-only session audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session event recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Successful credential login.
    Login,
    /// Explicit logout.
    Logout,
}

impl AuditAction {
    /// Stable wire representation, matching the persisted action column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }
}

/// Client request metadata captured alongside session events.
///
/// The address honours `X-Forwarded-For` when present, falling back to the
/// peer address; both fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    /// Client IP address, when determinable.
    pub ip_address: Option<String>,
    /// Raw `User-Agent` header.
    pub user_agent: Option<String>,
}

/// A persisted audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Persisted id.
    pub id: i32,
    /// Acting user.
    pub user_id: i32,
    /// Acting user's display name, resolved at read time.
    pub username: Option<String>,
    /// What happened.
    pub action: AuditAction,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Client IP, when captured.
    pub ip_address: Option<String>,
    /// Client user agent, when captured.
    pub user_agent: Option<String>,
}
