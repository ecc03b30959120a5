use std::path::Path;

use crate::commands::common::{ensure_published, PublishContext};
use crate::error::CliError;

pub async fn run_weblog(file: &Path, context: &PublishContext) -> Result<(), CliError> {
    let path = context.document_path(file)?;
    let outcome = context.publisher()?.publish_weblog(&path).await?;
    ensure_published(&outcome)
}
