//! Diesel-backed article repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::article::Article;
use crate::domain::policy::DomainScope;
use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, LikeOutcome, NewArticleRecord, PublicArticleFilter,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewLikeRow, NewNewsRow, NewsRow, NewsRowChanges};
use super::pool::{DbPool, PoolError};
use super::schema::{domains, news, news_likes, users};

/// Article persistence over the shared connection pool.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create the adapter over a pool handle.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: diesel::result::Error) -> ArticleRepositoryError {
    map_diesel_error(
        error,
        |message| ArticleRepositoryError::Query { message },
        |message| ArticleRepositoryError::Connection { message },
        |message| ArticleRepositoryError::Duplicate { message },
    )
}

fn pool_error(error: PoolError) -> ArticleRepositoryError {
    map_pool_error(error, |message| ArticleRepositoryError::Connection { message })
}

fn to_entity(row: NewsRow, domain_name: String, author_name: String) -> Article {
    Article {
        id: row.id,
        title: row.title,
        content: row.content,
        domain_id: row.domain_id,
        domain_name,
        author_id: row.author_id,
        author_name,
        date: row.date,
        editors: row.editors,
        likes_count: row.likes_count,
        archived: row.archived,
        pending_validation: row.pending_validation,
        validated_by: row.validated_by,
        validated_at: row.validated_at,
    }
}

/// Resolve domain and author display names for a batch of rows in two
/// lookups rather than one per row.
async fn attach_names(
    conn: &mut AsyncPgConnection,
    rows: Vec<NewsRow>,
) -> Result<Vec<Article>, diesel::result::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let domain_ids: Vec<i32> = rows.iter().map(|r| r.domain_id).collect();
    let author_ids: Vec<i32> = rows.iter().map(|r| r.author_id).collect();

    let domain_names: HashMap<i32, String> = domains::table
        .filter(domains::id.eq_any(&domain_ids))
        .select((domains::id, domains::name))
        .load::<(i32, String)>(conn)
        .await?
        .into_iter()
        .collect();
    let author_names: HashMap<i32, String> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select((users::id, users::username))
        .load::<(i32, String)>(conn)
        .await?
        .into_iter()
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let domain_name = domain_names.get(&row.domain_id).cloned().unwrap_or_default();
            let author_name = author_names.get(&row.author_id).cloned().unwrap_or_default();
            to_entity(row, domain_name, author_name)
        })
        .collect())
}

type BoxedNewsQuery<'a> = news::BoxedQuery<'a, diesel::pg::Pg>;

fn scoped_query(scope: DomainScope) -> Option<BoxedNewsQuery<'static>> {
    let query = news::table.order(news::date.desc()).into_boxed();
    match scope {
        DomainScope::All => Some(query),
        DomainScope::Domain(domain_id) => Some(query.filter(news::domain_id.eq(domain_id))),
        DomainScope::Nothing => None,
    }
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn find(&self, id: i32) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = news::table
            .find(id)
            .select(NewsRow::as_select())
            .first::<NewsRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let mut articles = attach_names(&mut conn, vec![row]).await.map_err(db_error)?;
                Ok(articles.pop())
            }
        }
    }

    async fn list_public(
        &self,
        filter: &PublicArticleFilter,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = news::table
            .filter(news::archived.eq(false))
            .filter(news::pending_validation.eq(false))
            .order(news::date.desc())
            .into_boxed();
        if let Some(domain_id) = filter.domain_id {
            query = query.filter(news::domain_id.eq(domain_id));
        }
        if let Some(term) = filter.query.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                news::title
                    .ilike(pattern.clone())
                    .or(news::content.ilike(pattern)),
            );
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }
        let rows = query
            .select(NewsRow::as_select())
            .load::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        attach_names(&mut conn, rows).await.map_err(db_error)
    }

    async fn list_all(&self, scope: DomainScope) -> Result<Vec<Article>, ArticleRepositoryError> {
        let Some(query) = scoped_query(scope) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = query
            .select(NewsRow::as_select())
            .load::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        attach_names(&mut conn, rows).await.map_err(db_error)
    }

    async fn list_by_author(
        &self,
        author_id: i32,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = news::table
            .filter(news::author_id.eq(author_id))
            .order(news::date.desc())
            .select(NewsRow::as_select())
            .load::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        attach_names(&mut conn, rows).await.map_err(db_error)
    }

    async fn list_archived(
        &self,
        scope: DomainScope,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let Some(query) = scoped_query(scope) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = query
            .filter(news::archived.eq(true))
            .select(NewsRow::as_select())
            .load::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        attach_names(&mut conn, rows).await.map_err(db_error)
    }

    async fn list_pending(
        &self,
        scope: DomainScope,
    ) -> Result<Vec<Article>, ArticleRepositoryError> {
        let Some(query) = scoped_query(scope) else {
            return Ok(Vec::new());
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = query
            .filter(news::pending_validation.eq(true))
            .filter(news::archived.eq(false))
            .select(NewsRow::as_select())
            .load::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        attach_names(&mut conn, rows).await.map_err(db_error)
    }

    async fn insert(
        &self,
        record: &NewArticleRecord,
    ) -> Result<Article, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(news::table)
            .values(NewNewsRow {
                title: &record.title,
                content: &record.content,
                domain_id: record.domain_id,
                author_id: record.author_id,
                date: record.date,
                pending_validation: record.pending_validation,
            })
            .returning(NewsRow::as_returning())
            .get_result::<NewsRow>(&mut conn)
            .await
            .map_err(db_error)?;
        let mut articles = attach_names(&mut conn, vec![row]).await.map_err(db_error)?;
        articles
            .pop()
            .ok_or_else(|| ArticleRepositoryError::Query {
                message: "inserted row vanished".to_owned(),
            })
    }

    async fn save(&self, article: &Article) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(news::table.find(article.id))
            .set(NewsRowChanges {
                title: &article.title,
                content: &article.content,
                date: article.date,
                editors: &article.editors,
                archived: article.archived,
                pending_validation: article.pending_validation,
                validated_by: article.validated_by,
                validated_at: article.validated_at,
            })
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(news::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn add_like(
        &self,
        article_id: i32,
        ip_address: &str,
    ) -> Result<LikeOutcome, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // The like row and the counter bump commit together or not at all.
        conn.transaction::<LikeOutcome, diesel::result::Error, _>(|conn| {
            async move {
                let inserted = diesel::insert_into(news_likes::table)
                    .values(NewLikeRow {
                        news_id: article_id,
                        ip_address,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                if inserted == 0 {
                    let likes_count = news::table
                        .find(article_id)
                        .select(news::likes_count)
                        .first::<i32>(conn)
                        .await?;
                    return Ok(LikeOutcome {
                        likes_count,
                        newly_added: false,
                    });
                }
                let likes_count = diesel::update(news::table.find(article_id))
                    .set(news::likes_count.eq(news::likes_count + 1))
                    .returning(news::likes_count)
                    .get_result::<i32>(conn)
                    .await?;
                Ok(LikeOutcome {
                    likes_count,
                    newly_added: true,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(db_error)
    }

    async fn archive_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changed = diesel::update(
            news::table
                .filter(news::archived.eq(false))
                .filter(news::pending_validation.eq(false))
                .filter(news::date.lt(cutoff)),
        )
        .set(news::archived.eq(true))
        .execute(&mut conn)
        .await
        .map_err(db_error)?;
        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }
}
