//! Row structs bridging the Diesel schema and the domain entities.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{audit_log, domains, news, news_likes, subscribers, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub domain_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub domain_id: Option<i32>,
}

/// Column-level user update. `None` leaves a column unchanged; the nested
/// option on `domain_id` writes NULL.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserRowChanges<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
    pub domain_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DomainRow {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = domains)]
pub struct DomainRowValues<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewsRow {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub domain_id: i32,
    pub author_id: i32,
    pub date: DateTime<Utc>,
    pub editors: Vec<String>,
    pub likes_count: i32,
    pub archived: bool,
    pub pending_validation: bool,
    pub validated_by: Option<i32>,
    pub validated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = news)]
pub struct NewNewsRow<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub domain_id: i32,
    pub author_id: i32,
    pub date: DateTime<Utc>,
    pub pending_validation: bool,
}

/// Full rewrite of the mutable article columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = news)]
#[diesel(treat_none_as_null = true)]
pub struct NewsRowChanges<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub date: DateTime<Utc>,
    pub editors: &'a [String],
    pub archived: bool,
    pub pending_validation: bool,
    pub validated_by: Option<i32>,
    pub validated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = news_likes)]
pub struct NewLikeRow<'a> {
    pub news_id: i32,
    pub ip_address: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriberRow {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subscribers)]
pub struct NewSubscriberRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditRow {
    pub id: i32,
    pub user_id: i32,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditRow<'a> {
    pub user_id: i32,
    pub action: &'a str,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}
