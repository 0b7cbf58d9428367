//! GraphQL schema
//!
//! Object types wrap the domain entities and delegate every field that needs
//! the store to [`resolvers`](crate::resolvers). The per-request
//! [`RequestContext`] is attached as request data by the HTTP handler.

use crate::core::context::RequestContext;
use crate::core::entity::{Link, User};
use crate::core::error::LinkFeedError;
use crate::core::query::{Feed, FeedArgs, LinkOrderByInput};
use crate::resolvers;
use crate::server::exposure::graphql::error_codes::RequestErrorCodes;
use async_graphql::{Context, EmptySubscription, ErrorExtensions, ID, Object, Schema};
use chrono::{DateTime, Utc};

pub type LinkFeedSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema
pub fn build_schema(max_depth: usize) -> LinkFeedSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(max_depth)
        .extension(RequestErrorCodes)
        .finish()
}

/// Convert a resolver error into a GraphQL error carrying `extensions.code`
fn graphql_error(err: LinkFeedError) -> async_graphql::Error {
    match &err {
        LinkFeedError::Storage(_) | LinkFeedError::Internal(_) => {
            tracing::error!(error = %err, code = err.error_code(), "resolver failed");
        }
        _ => {}
    }
    err.extend()
}

fn request_context<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Paginated, filterable, orderable list of links
    async fn feed(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
        order_by: Option<Vec<LinkOrderByInput>>,
    ) -> async_graphql::Result<FeedObject> {
        let args = FeedArgs {
            filter,
            skip,
            take,
            order_by,
        };

        resolvers::feed(request_context(ctx)?, args)
            .await
            .map(FeedObject)
            .map_err(graphql_error)
    }

    /// A single link by id, or null
    async fn single_link(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> async_graphql::Result<Option<LinkObject>> {
        resolvers::single_link(request_context(ctx)?, id)
            .await
            .map(|link| link.map(LinkObject))
            .map_err(graphql_error)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Post a new link as the authenticated user
    async fn post(
        &self,
        ctx: &Context<'_>,
        description: String,
        url: String,
    ) -> async_graphql::Result<LinkObject> {
        resolvers::post(request_context(ctx)?, description, url)
            .await
            .map(LinkObject)
            .map_err(graphql_error)
    }
}

/// GraphQL view of a [`Link`]
pub struct LinkObject(pub Link);

#[Object(name = "Link")]
impl LinkObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn url(&self) -> &str {
        &self.0.url
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn posted_by(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        resolvers::author(request_context(ctx)?, &self.0)
            .await
            .map(|user| user.map(UserObject))
            .map_err(graphql_error)
    }

    async fn voters(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<UserObject>> {
        resolvers::voters(request_context(ctx)?, &self.0)
            .await
            .map(|users| users.into_iter().map(UserObject).collect())
            .map_err(graphql_error)
    }
}

/// GraphQL view of a [`User`]
pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    /// Links posted by this user
    async fn links(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<LinkObject>> {
        resolvers::links_by_author(request_context(ctx)?, &self.0)
            .await
            .map(|links| links.into_iter().map(LinkObject).collect())
            .map_err(graphql_error)
    }
}

/// GraphQL view of a [`Feed`]
pub struct FeedObject(pub Feed);

#[Object(name = "Feed")]
impl FeedObject {
    async fn links(&self) -> Vec<LinkObject> {
        self.0.links.iter().cloned().map(LinkObject).collect()
    }

    /// Total number of links matching the filter
    async fn count(&self) -> i32 {
        i32::try_from(self.0.count).unwrap_or(i32::MAX)
    }

    async fn id(&self) -> Option<ID> {
        Some(ID(self.0.id.clone()))
    }
}
