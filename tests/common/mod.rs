//! Shared fixtures for integration tests
//!
//! Each test binary includes this module with `mod common;` and uses only
//! part of it.

#![allow(dead_code)]

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use linkfeed::prelude::*;
use std::sync::Arc;
use std::time::Duration;

pub const SECRET: &str = "integration-secret";

/// Sign a token for `user_id` with the test secret
pub fn token(user_id: i32) -> String {
    sign(&serde_json::json!({ "userId": user_id }), SECRET)
}

pub fn sign(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign token")
}

/// Config using the test secret and an in-memory store, without seed users
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default_config();
    config.auth.secret = SECRET.to_string();
    config.seed.users.clear();
    config
}

pub struct Fixture {
    pub store: Arc<InMemoryLinkStore>,
    pub alice: User,
    pub bob: User,
    pub links: Vec<Link>,
}

impl Fixture {
    /// Context carrying `user_id` (or none)
    pub fn context(&self, user_id: Option<i32>) -> RequestContext {
        RequestContext::new(self.store.clone(), user_id)
    }

    pub fn ids(links: &[Link]) -> Vec<i32> {
        links.iter().map(|l| l.id).collect()
    }
}

pub async fn create_user(store: &InMemoryLinkStore, name: &str) -> User {
    store
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        })
        .await
        .expect("failed to create user")
}

pub async fn create_link(store: &InMemoryLinkStore, description: &str, url: &str, by: &User) -> Link {
    store
        .create_link(NewLink {
            description: description.to_string(),
            url: url.to_string(),
            posted_by_id: by.id,
        })
        .await
        .expect("failed to create link")
}

/// Two users and five links with distinct creation times.
///
/// | id | description                   | url                      | author |
/// |----|-------------------------------|--------------------------|--------|
/// | 1  | Rust programming language     | https://rust-lang.org    | alice  |
/// | 2  | The Go Programming Language   | https://go.dev           | bob    |
/// | 3  | rustup installer              | https://rustup.rs        | alice  |
/// | 4  | GraphQL spec                  | https://spec.graphql.org | bob    |
/// | 5  | Prisma ORM                    | https://prisma.io        | alice  |
pub async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryLinkStore::new());
    let alice = create_user(&store, "Alice").await;
    let bob = create_user(&store, "Bob").await;

    let rows = [
        ("Rust programming language", "https://rust-lang.org", &alice),
        ("The Go Programming Language", "https://go.dev", &bob),
        ("rustup installer", "https://rustup.rs", &alice),
        ("GraphQL spec", "https://spec.graphql.org", &bob),
        ("Prisma ORM", "https://prisma.io", &alice),
    ];

    let mut links = Vec::new();
    for (description, url, author) in rows {
        links.push(create_link(&store, description, url, author).await);
        // Keep created_at strictly increasing
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    Fixture {
        store,
        alice,
        bob,
        links,
    }
}
