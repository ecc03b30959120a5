use lolpub_core::publish::PasteOptions;

use crate::cli::{flag_pair, PasteCommands};
use crate::commands::common::{ensure_published, PublishContext};
use crate::error::CliError;

pub async fn run_paste(command: PasteCommands, context: &PublishContext) -> Result<(), CliError> {
    match command {
        PasteCommands::Publish {
            file,
            title,
            listed,
            unlisted,
        } => {
            let path = context.document_path(&file)?;
            let options = PasteOptions {
                title,
                listed: flag_pair(listed, unlisted),
            };
            let outcome = context.publisher()?.publish_paste(&path, options).await?;
            ensure_published(&outcome)
        }
        PasteCommands::Delete { file } => {
            let path = context.document_path(&file)?;
            context.publisher()?.delete_paste(&path).await?;
            Ok(())
        }
    }
}
