//! Data access layer between resolvers and the relational store

use crate::core::entity::{Link, NewLink, NewUser, User, Vote};
use crate::core::error::StorageResult;
use crate::core::query::FeedQuery;
use async_trait::async_trait;

/// Repository-style access to links, users and votes.
///
/// Relations are exposed as explicit methods (`get_author`, `get_voters`,
/// `links_by_author`) rather than lazily traversed objects. Every failure
/// to reach or query the backend is reported as a
/// [`StorageError`](crate::core::error::StorageError); lookups that find
/// nothing return `None` or an empty list.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Short backend name used in logs and error details
    fn backend(&self) -> &'static str;

    /// Links matching the query's filter, ordered and paginated
    async fn find_links(&self, query: &FeedQuery) -> StorageResult<Vec<Link>>;

    /// Number of links matching `filter`, ignoring pagination
    async fn count_links(&self, filter: Option<&str>) -> StorageResult<i64>;

    /// One feed page together with the total match count.
    ///
    /// The default runs [`find_links`](Self::find_links) and
    /// [`count_links`](Self::count_links) separately, so a concurrent write
    /// between the two may make them disagree. Backends that can evaluate
    /// both against one snapshot override this.
    async fn feed_page(&self, query: &FeedQuery) -> StorageResult<(Vec<Link>, i64)> {
        let links = self.find_links(query).await?;
        let count = self.count_links(query.filter.as_deref()).await?;
        Ok((links, count))
    }

    /// Get a link by id
    async fn get_link(&self, id: i32) -> StorageResult<Option<Link>>;

    /// Insert a link; id and `created_at` are generated by the store.
    ///
    /// Fails with `IntegrityViolation` when the author does not exist.
    async fn create_link(&self, link: NewLink) -> StorageResult<Link>;

    /// Author of a link, if the link exists and has one
    async fn get_author(&self, link_id: i32) -> StorageResult<Option<User>>;

    /// Users who voted for a link, ordered by user id
    async fn get_voters(&self, link_id: i32) -> StorageResult<Vec<User>>;

    /// Get a user by id
    async fn get_user(&self, id: i32) -> StorageResult<Option<User>>;

    /// Insert a user
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;

    /// Links posted by a user, ordered by link id
    async fn links_by_author(&self, user_id: i32) -> StorageResult<Vec<Link>>;

    /// Record a vote. Voting twice for the same link creates nothing and
    /// returns the existing vote.
    async fn add_vote(&self, user_id: i32, link_id: i32) -> StorageResult<Vote>;
}
