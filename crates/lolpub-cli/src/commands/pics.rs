use lolpub_core::client::PictureInfo;
use lolpub_core::models::PicMetadata;
use lolpub_core::publish::{EmbedScope, PicUpload};
use serde_json::json;

use crate::cli::{flag_pair, PicsCommands};
use crate::commands::common::{ensure_published, PublishContext};
use crate::error::CliError;

pub async fn run_pics(command: PicsCommands, context: &PublishContext) -> Result<(), CliError> {
    match command {
        PicsCommands::Upload {
            file,
            description,
            alt,
            tags,
            public,
        } => {
            let path = context.document_path(&file)?;
            let upload = PicUpload {
                description,
                alt_text: alt,
                tags,
                public,
            };
            let outcome = context.publisher()?.upload_picture(&path, upload).await?;
            ensure_published(&outcome)
        }
        PicsCommands::Embeds { note, line } => {
            let path = context.document_path(&note)?;
            let scope = line.map_or(EmbedScope::All, EmbedScope::Line);
            let report = context.publisher()?.upload_embeds(&path, scope).await?;
            for identity in &report.uploaded {
                if let Some(url) = &identity.url {
                    println!("{url}");
                }
            }
            Ok(())
        }
        PicsCommands::Edit {
            id,
            description,
            alt,
            tags,
            public,
            hidden,
        } => {
            let publisher = context.publisher()?;
            let current = publisher.fetch_picture(&id).await?;
            let metadata = merge_metadata(&current, description, alt, tags, flag_pair(public, hidden));
            publisher.edit_picture(&id, &metadata).await?;
            Ok(())
        }
        PicsCommands::Show { id, json } => {
            let picture = context.publisher()?.fetch_picture(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&picture_json(&picture))?);
            } else {
                for line in format_picture_lines(&picture) {
                    println!("{line}");
                }
            }
            Ok(())
        }
    }
}

/// Current metadata with the given overrides applied.
pub fn merge_metadata(
    current: &PictureInfo,
    description: Option<String>,
    alt_text: Option<String>,
    tags: Option<String>,
    public: Option<bool>,
) -> PicMetadata {
    PicMetadata {
        description: description.unwrap_or_else(|| current.description.clone()),
        alt_text: alt_text.unwrap_or_else(|| current.alt_text.clone()),
        tags: tags.unwrap_or_else(|| current.tags.clone()),
        public: public.unwrap_or(!current.hidden),
    }
}

pub fn picture_json(picture: &PictureInfo) -> serde_json::Value {
    json!({
        "id": picture.id,
        "url": picture.url,
        "description": picture.description,
        "alt_text": picture.alt_text,
        "tags": picture.tags,
        "hidden": picture.hidden,
    })
}

pub fn format_picture_lines(picture: &PictureInfo) -> Vec<String> {
    let visibility = if picture.hidden { "hidden" } else { "public" };
    vec![
        format!("{}  {}", picture.id, picture.url),
        format!("description: {}", picture.description),
        format!("alt text:    {}", picture.alt_text),
        format!("tags:        {}", picture.tags),
        format!("visibility:  {visibility}"),
    ]
}
