use crate::core::context::RequestContext;
use crate::core::entity::{Link, User};
use crate::core::error::LinkFeedResult;

/// Resolve `singleLink`. An unknown id yields `None`.
pub async fn single_link(ctx: &RequestContext, id: i32) -> LinkFeedResult<Option<Link>> {
    Ok(ctx.store().get_link(id).await?)
}

/// `Link.postedBy`
pub async fn author(ctx: &RequestContext, link: &Link) -> LinkFeedResult<Option<User>> {
    if link.posted_by_id.is_none() {
        return Ok(None);
    }
    Ok(ctx.store().get_author(link.id).await?)
}

/// `Link.voters`, ordered by user id
pub async fn voters(ctx: &RequestContext, link: &Link) -> LinkFeedResult<Vec<User>> {
    Ok(ctx.store().get_voters(link.id).await?)
}

/// `User.links`, ordered by link id
pub async fn links_by_author(ctx: &RequestContext, user: &User) -> LinkFeedResult<Vec<Link>> {
    Ok(ctx.store().links_by_author(user.id).await?)
}
