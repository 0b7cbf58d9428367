use crate::core::context::RequestContext;
use crate::core::entity::{Link, NewLink};
use crate::core::error::{LinkFeedError, LinkFeedResult, StorageError, ValidationError};

/// Resolve the `post` mutation.
///
/// Requires an identity that still maps to an existing user; nothing is
/// written otherwise. The new link is authored by the caller.
pub async fn post(ctx: &RequestContext, description: String, url: String) -> LinkFeedResult<Link> {
    let user_id = match ctx.require_user("Cannot post without logging in.") {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("rejected post without identity");
            return Err(e);
        }
    };

    ValidationError::check_text("description", &description)?;
    ValidationError::check_text("url", &url)?;

    if ctx.store().get_user(user_id).await?.is_none() {
        tracing::warn!(user_id, "rejected post from unknown user");
        return Err(LinkFeedError::unauthenticated("user no longer exists"));
    }

    // The author may be deleted between the lookup and the insert.
    let link = match ctx
        .store()
        .create_link(NewLink {
            description,
            url,
            posted_by_id: user_id,
        })
        .await
    {
        Ok(link) => link,
        Err(StorageError::IntegrityViolation { message, .. }) => {
            tracing::warn!(user_id, error = %message, "author vanished before link insert");
            return Err(LinkFeedError::unauthenticated("user no longer exists"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(link_id = link.id, user_id, "link posted");

    Ok(link)
}
