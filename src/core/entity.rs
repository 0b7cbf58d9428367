//! Domain entities: users, the links they post, and the votes they cast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Users are created by the registration flow (or by config seeding); the
/// API only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A posted link.
///
/// `posted_by_id` is `None` only when the author reference is absent in the
/// store; links created through the API always carry their author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i32,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub posted_by_id: Option<i32>,
}

/// A user's vote for a link. At most one per (user, link) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vote {
    pub link_id: i32,
    pub user_id: i32,
}

/// Input for creating a link; id and timestamp are generated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub description: String,
    pub url: String,
    pub posted_by_id: i32,
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}
