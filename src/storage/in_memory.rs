//! In-memory implementation of LinkStore for testing and development

use crate::core::entity::{Link, NewLink, NewUser, User, Vote};
use crate::core::error::{StorageError, StorageResult};
use crate::core::query::{FeedQuery, matches_filter};
use crate::core::service::LinkStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const BACKEND: &str = "in-memory";

#[derive(Default)]
struct State {
    users: BTreeMap<i32, User>,
    links: BTreeMap<i32, Link>,
    votes: BTreeSet<Vote>,
    last_user_id: i32,
    last_link_id: i32,
}

/// In-memory store
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// ids are assigned sequentially starting at 1.
#[derive(Clone, Default)]
pub struct InMemoryLinkStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|e| StorageError::Unavailable {
            backend: BACKEND.to_string(),
            message: format!("Failed to acquire read lock: {}", e),
        })
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|e| StorageError::Unavailable {
            backend: BACKEND.to_string(),
            message: format!("Failed to acquire write lock: {}", e),
        })
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn find_links(&self, query: &FeedQuery) -> StorageResult<Vec<Link>> {
        let state = self.read()?;
        Ok(query.evaluate(state.links.values()).0)
    }

    async fn count_links(&self, filter: Option<&str>) -> StorageResult<i64> {
        let state = self.read()?;
        let count = state
            .links
            .values()
            .filter(|link| matches_filter(filter, link))
            .count();
        Ok(count as i64)
    }

    async fn feed_page(&self, query: &FeedQuery) -> StorageResult<(Vec<Link>, i64)> {
        // One guard for both page and count
        let state = self.read()?;
        let (links, count) = query.evaluate(state.links.values());
        Ok((links, count as i64))
    }

    async fn get_link(&self, id: i32) -> StorageResult<Option<Link>> {
        let state = self.read()?;
        Ok(state.links.get(&id).cloned())
    }

    async fn create_link(&self, link: NewLink) -> StorageResult<Link> {
        let mut state = self.write()?;

        if !state.users.contains_key(&link.posted_by_id) {
            return Err(StorageError::IntegrityViolation {
                backend: BACKEND.to_string(),
                message: format!("user {} does not exist", link.posted_by_id),
            });
        }

        state.last_link_id += 1;
        let created = Link {
            id: state.last_link_id,
            description: link.description,
            url: link.url,
            created_at: Utc::now(),
            posted_by_id: Some(link.posted_by_id),
        };
        state.links.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_author(&self, link_id: i32) -> StorageResult<Option<User>> {
        let state = self.read()?;
        Ok(state
            .links
            .get(&link_id)
            .and_then(|link| link.posted_by_id)
            .and_then(|user_id| state.users.get(&user_id))
            .cloned())
    }

    async fn get_voters(&self, link_id: i32) -> StorageResult<Vec<User>> {
        let state = self.read()?;
        // BTreeSet<Vote> orders by (link_id, user_id)
        Ok(state
            .votes
            .range(Vote { link_id, user_id: i32::MIN }..=Vote { link_id, user_id: i32::MAX })
            .filter_map(|vote| state.users.get(&vote.user_id))
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut state = self.write()?;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::IntegrityViolation {
                backend: BACKEND.to_string(),
                message: format!("email {} is already registered", user.email),
            });
        }

        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            name: user.name,
            email: user.email,
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn links_by_author(&self, user_id: i32) -> StorageResult<Vec<Link>> {
        let state = self.read()?;
        Ok(state
            .links
            .values()
            .filter(|link| link.posted_by_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn add_vote(&self, user_id: i32, link_id: i32) -> StorageResult<Vote> {
        let mut state = self.write()?;

        if !state.users.contains_key(&user_id) || !state.links.contains_key(&link_id) {
            return Err(StorageError::IntegrityViolation {
                backend: BACKEND.to_string(),
                message: format!("vote references unknown user {} or link {}", user_id, link_id),
            });
        }

        let vote = Vote { link_id, user_id };
        state.votes.insert(vote);

        Ok(vote)
    }
}
