use crate::commands::common::{ensure_published, resolve_status_text, PublishContext};
use crate::error::CliError;

/// `mastodon` overrides the profile's cross-post setting when given.
pub async fn run_status(
    text_parts: &[String],
    mastodon: Option<bool>,
    context: &PublishContext,
) -> Result<(), CliError> {
    let text = resolve_status_text(text_parts)?;
    let publisher = context.publisher()?;
    let outcome = publisher
        .post_status(&text, mastodon.map(|cross_post| !cross_post))
        .await?;
    ensure_published(&outcome)
}
