//! Resolver functions
//!
//! Each resolver takes the per-request [`RequestContext`](crate::core::RequestContext)
//! explicitly and returns a [`LinkFeedResult`](crate::core::LinkFeedResult).
//! The GraphQL layer in [`server::exposure::graphql`](crate::server::exposure::graphql)
//! only maps arguments and errors onto these functions.

pub mod feed;
pub mod link;
pub mod post;

pub use feed::feed;
pub use link::{author, links_by_author, single_link, voters};
pub use post::post;
