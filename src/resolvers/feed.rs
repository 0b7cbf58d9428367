use crate::core::context::RequestContext;
use crate::core::error::LinkFeedResult;
use crate::core::query::{Feed, FeedArgs};

/// Resolve the `feed` query.
///
/// Arguments are validated before the store is touched. The returned
/// `count` is the number of filter matches regardless of `skip`/`take`.
pub async fn feed(ctx: &RequestContext, args: FeedArgs) -> LinkFeedResult<Feed> {
    let query = args.validate()?;

    let (links, count) = ctx.store().feed_page(&query).await?;
    let id = query.feed_id();

    tracing::debug!(
        filter = ?query.filter,
        skip = query.skip,
        take = ?query.take,
        returned = links.len(),
        count,
        "resolved feed"
    );

    Ok(Feed { links, count, id })
}
