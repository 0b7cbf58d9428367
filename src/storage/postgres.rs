//! PostgreSQL storage backend using sqlx.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! linkfeed = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Tables are created by the migrations in `./migrations` (see
//! [`PostgresLinkStore::migrate`]): `users`, `links` with a foreign key to
//! its author, and `votes` keyed by `(user_id, link_id)`.
//!
//! # Ordering
//!
//! Text columns are sorted with `COLLATE "C"` so the database orders them
//! byte-wise, the same way the in-memory backend does. Every feed query
//! ends with `id ASC` to make pagination stable.

use crate::core::entity::{Link, NewLink, NewUser, User, Vote};
use crate::core::error::{StorageError, StorageResult};
use crate::core::query::{FeedQuery, OrderField, Sort};
use crate::core::service::LinkStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;

const BACKEND: &str = "postgres";

const LINK_COLUMNS: &str = "id, description, url, created_at, posted_by_id";

type LinkRow = (i32, String, String, DateTime<Utc>, Option<i32>);
type UserRow = (i32, String, String);

fn link_from_row((id, description, url, created_at, posted_by_id): LinkRow) -> Link {
    Link {
        id,
        description,
        url,
        created_at,
        posted_by_id,
    }
}

fn user_from_row((id, name, email): UserRow) -> User {
    User { id, name, email }
}

/// Map a sqlx error onto the storage error taxonomy.
fn storage_error(context: &str, e: sqlx::Error) -> StorageError {
    let message = format!("{}: {}", context, e);
    match &e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable {
            backend: BACKEND.to_string(),
            message,
        },
        // 23503 foreign_key_violation, 23505 unique_violation
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some("23503") | Some("23505")) =>
        {
            StorageError::IntegrityViolation {
                backend: BACKEND.to_string(),
                message,
            }
        }
        _ => StorageError::QueryFailed {
            backend: BACKEND.to_string(),
            message,
        },
    }
}

fn non_empty(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}

/// Append the case-sensitive substring filter (`strpos` avoids LIKE escaping).
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: Option<&str>) {
    if let Some(needle) = non_empty(filter) {
        builder
            .push(" WHERE strpos(description, ")
            .push_bind(needle.to_string())
            .push(") > 0 OR strpos(url, ")
            .push_bind(needle.to_string())
            .push(") > 0");
    }
}

fn order_column(field: OrderField) -> &'static str {
    // Column names are fixed here, never taken from input
    match field {
        OrderField::Description => "description COLLATE \"C\"",
        OrderField::Url => "url COLLATE \"C\"",
        OrderField::CreatedAt => "created_at",
    }
}

fn page_query(query: &FeedQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM links", LINK_COLUMNS));
    push_filter(&mut builder, query.filter.as_deref());

    builder.push(" ORDER BY ");
    for order in &query.order_by {
        let direction = match order.direction {
            Sort::Asc => "ASC",
            Sort::Desc => "DESC",
        };
        builder
            .push(order_column(order.field))
            .push(" ")
            .push(direction)
            .push(", ");
    }
    builder.push("id ASC");

    if let Some(take) = query.take {
        builder.push(" LIMIT ").push_bind(take as i64);
    }
    builder.push(" OFFSET ").push_bind(query.skip as i64);

    builder
}

fn count_query(filter: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM links");
    push_filter(&mut builder, filter);
    builder
}

/// Link store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use linkfeed::storage::PostgresLinkStore;
///
/// let store = PostgresLinkStore::connect("postgres://localhost/linkfeed", 5).await?;
/// store.migrate().await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresLinkStore {
    pool: PgPool,
}

impl PostgresLinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| StorageError::Unavailable {
                backend: BACKEND.to_string(),
                message: format!("Failed to connect: {}", e),
            })?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations (idempotent).
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed {
                backend: BACKEND.to_string(),
                message: format!("Failed to run migrations: {}", e),
            })
    }
}

#[async_trait]
impl LinkStore for PostgresLinkStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn find_links(&self, query: &FeedQuery) -> StorageResult<Vec<Link>> {
        let rows = page_query(query)
            .build_query_as::<LinkRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to fetch links", e))?;

        Ok(rows.into_iter().map(link_from_row).collect())
    }

    async fn count_links(&self, filter: Option<&str>) -> StorageResult<i64> {
        count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to count links", e))
    }

    async fn feed_page(&self, query: &FeedQuery) -> StorageResult<(Vec<Link>, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        // Page and count must observe the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to set isolation level", e))?;

        let rows = page_query(query)
            .build_query_as::<LinkRow>()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to fetch links", e))?;

        let count = count_query(query.filter.as_deref())
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to count links", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok((rows.into_iter().map(link_from_row).collect(), count))
    }

    async fn get_link(&self, id: i32) -> StorageResult<Option<Link>> {
        let sql = format!("SELECT {} FROM links WHERE id = $1", LINK_COLUMNS);
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get link", e))?;

        Ok(row.map(link_from_row))
    }

    async fn create_link(&self, link: NewLink) -> StorageResult<Link> {
        let sql = format!(
            "INSERT INTO links (description, url, posted_by_id) VALUES ($1, $2, $3) RETURNING {}",
            LINK_COLUMNS
        );
        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&link.description)
            .bind(&link.url)
            .bind(link.posted_by_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to create link", e))?;

        Ok(link_from_row(row))
    }

    async fn get_author(&self, link_id: i32) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.name, u.email FROM links l \
             JOIN users u ON u.id = l.posted_by_id \
             WHERE l.id = $1",
        )
        .bind(link_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get author", e))?;

        Ok(row.map(user_from_row))
    }

    async fn get_voters(&self, link_id: i32) -> StorageResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.name, u.email FROM votes v \
             JOIN users u ON u.id = v.user_id \
             WHERE v.link_id = $1 ORDER BY u.id",
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get voters", e))?;

        Ok(rows.into_iter().map(user_from_row).collect())
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get user", e))?;

        Ok(row.map(user_from_row))
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create user", e))?;

        Ok(user_from_row(row))
    }

    async fn links_by_author(&self, user_id: i32) -> StorageResult<Vec<Link>> {
        let sql = format!(
            "SELECT {} FROM links WHERE posted_by_id = $1 ORDER BY id",
            LINK_COLUMNS
        );
        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get links by author", e))?;

        Ok(rows.into_iter().map(link_from_row).collect())
    }

    async fn add_vote(&self, user_id: i32, link_id: i32) -> StorageResult<Vote> {
        sqlx::query(
            "INSERT INTO votes (user_id, link_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(link_id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to add vote", e))?;

        Ok(Vote { link_id, user_id })
    }
}
