//! User-level publish operations.
//!
//! [`Publisher`] wires the resolver, extractor, payload builder and client to
//! the reconciliation and log writers. Every operation that returns `Ok`
//! sends exactly one terminal [`Notice`]; an `Err` is left for the caller to
//! surface and has made no local change.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{Local, SecondsFormat, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::alt_text::generate_alt_text;
use crate::audit_log::{append_pic_log, append_status_log, capture_time};
use crate::client::{PictureInfo, PreviousPaste, PublishClient, Transport};
use crate::config::{Account, Settings};
use crate::error::PublishError;
use crate::extract::extract_status;
use crate::fallback::write_fallback;
use crate::frontmatter::{strip_frontmatter, Document};
use crate::models::{LogEntry, PasteDraft, PicMetadata, PublishOutcome, RemoteIdentity, TargetKind, WeblogDraft};
use crate::notify::{Interaction, Notice};
use crate::reconcile::{clear_paste, reconcile_paste, reconcile_weblog, rename_after_publish, should_rename};
use crate::slug::{is_reusable_paste_slug, resolve_slug, slugify_paste_title};
use crate::store::DocumentStore;
use crate::util::file_stem;
use crate::{Error, Result};

static EMBED: OnceLock<Regex> = OnceLock::new();

fn embed_pattern() -> &'static Regex {
    EMBED.get_or_init(|| Regex::new(r"!\[\[(.*?)\]\]").expect("Invalid regex"))
}

const PUBLISHABLE_STATUSES: [&str; 2] = ["published", "draft"];

/// Caller overrides for a paste publish. `None` keeps the recorded value or prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteOptions {
    pub title: Option<String>,
    pub listed: Option<bool>,
}

/// Inputs for a single picture upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PicUpload {
    pub description: String,
    /// Generated (or the file name) when absent
    pub alt_text: Option<String>,
    /// Configured default tags when absent
    pub tags: Option<String>,
    pub public: bool,
}

/// Which embeds of a note to upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedScope {
    All,
    /// One line, numbered from 1
    Line(usize),
}

/// Result of an embed upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub uploaded: Vec<RemoteIdentity>,
    /// Embeds that could not be resolved or uploaded
    pub failed: Vec<String>,
}

struct UploadedPicture {
    identity: RemoteIdentity,
    url: String,
    alt_text: String,
    caveat: Option<String>,
}

/// Orchestrates publish operations for one account.
pub struct Publisher<'a, T, S: ?Sized, I: ?Sized> {
    client: PublishClient<T>,
    settings: &'a Settings,
    store: &'a S,
    interaction: &'a I,
}

impl<'a, T, S, I> Publisher<'a, T, S, I>
where
    T: Transport,
    S: DocumentStore + ?Sized,
    I: Interaction + ?Sized,
{
    /// Fails with a configuration error when the account is incomplete.
    pub fn new(
        account: &Account,
        settings: &'a Settings,
        transport: T,
        store: &'a S,
        interaction: &'a I,
    ) -> Result<Self> {
        Ok(Self {
            client: PublishClient::new(account, transport)?,
            settings,
            store,
            interaction,
        })
    }

    pub const fn client(&self) -> &PublishClient<T> {
        &self.client
    }

    fn ensure_enabled(target: TargetKind, enabled: bool) -> Result<()> {
        if enabled {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} publishing is disabled in settings",
                target.label()
            )))
        }
    }

    /// Post a status. On failure the text is saved to a new local note.
    pub async fn post_status(&self, text: &str, skip_mastodon_post: Option<bool>) -> Result<PublishOutcome> {
        let settings = &self.settings.status;
        Self::ensure_enabled(TargetKind::Status, settings.enabled)?;
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("status text is empty".to_string()));
        }

        let item = extract_status(text, &settings.default_emoji);
        let skip = skip_mastodon_post.unwrap_or(settings.skip_mastodon_post);

        match self.client.post_status(&item, skip).await {
            Ok(identity) => {
                if let Err(error) = append_status_log(
                    self.store,
                    settings,
                    item.raw_text.trim(),
                    identity.url.as_deref(),
                    Local::now(),
                ) {
                    warn!("Failed to append status log: {error}");
                }
                self.interaction.notify(Notice::Success(format!(
                    "Status posted: {}",
                    identity.url.as_deref().unwrap_or_default()
                )));
                Ok(PublishOutcome::Published {
                    target: TargetKind::Status,
                    identity,
                    updated: false,
                })
            }
            Err(error) => {
                warn!("Status post failed: {error}");
                let local_path = write_fallback(
                    self.store,
                    settings.fallback_folder.as_deref(),
                    &item.raw_text,
                    Local::now(),
                )?;
                self.interaction.notify(Notice::Failure {
                    target: TargetKind::Status,
                    message: format!("Failed to post status: {error}"),
                    saved_to: Some(local_path.clone()),
                });
                Ok(PublishOutcome::SavedLocally {
                    target: TargetKind::Status,
                    local_path,
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Publish or update the weblog entry stored in `path`.
    pub async fn publish_weblog(&self, path: &Path) -> Result<PublishOutcome> {
        let settings = &self.settings.weblog;
        Self::ensure_enabled(TargetKind::Weblog, settings.enabled)?;

        let content = self.store.read(path)?;
        let document = Document::parse(&content)?;
        if !document.has_block {
            return Err(Error::InvalidInput(format!(
                "{} is missing front-matter",
                path.display()
            )));
        }
        let frontmatter = &document.frontmatter;

        let status = frontmatter.get_str("status");
        if !status
            .as_deref()
            .is_some_and(|status| PUBLISHABLE_STATUSES.contains(&status.to_lowercase().as_str()))
        {
            return Err(Error::InvalidInput(format!(
                "{} front-matter must include `status: published` or `status: draft`",
                path.display()
            )));
        }

        let title = frontmatter.get_str("title").unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let slug = frontmatter
            .get_str("slug")
            .filter(|slug| slug != "undefined")
            .unwrap_or_else(|| {
                resolve_slug(&title, &content, &file_name, settings.effective_slug_word_count())
            });
        let date = frontmatter
            .get_str("date")
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let entry_id = frontmatter.get_str("entry");
        let entry_type = frontmatter.get_str("type");

        let draft = WeblogDraft {
            title,
            slug,
            date,
            entry_type: entry_type.clone(),
            status,
            tags: frontmatter.string_list("tags"),
            body: strip_frontmatter(&content).to_string(),
        };

        let identity = match self.client.publish_weblog(&draft, entry_id.as_deref()).await {
            Ok(identity) => identity,
            Err(error) => return Ok(self.document_failure(path, &error)),
        };

        let mut caveat = None;
        if let Err(error) = reconcile_weblog(self.store, path, &identity, &draft.date) {
            warn!(path = %path.display(), "Failed to record weblog entry in front-matter: {error}");
            caveat = Some(format!("front-matter was not updated: {error}"));
        } else if should_rename(settings, entry_type.as_deref()) {
            if let Err(error) =
                rename_after_publish(self.store, path, &draft.date, &identity.slug, Local::now())
            {
                warn!(path = %path.display(), "Failed to rename published document: {error}");
                caveat = Some(format!("document was not renamed: {error}"));
            }
        }

        let updated = entry_id.is_some();
        let message = if updated {
            "Weblog entry updated"
        } else {
            "Weblog entry published"
        };
        Ok(self.finish(TargetKind::Weblog, identity, updated, message, caveat))
    }

    /// Publish the document at `path` to the pastebin.
    ///
    /// Without a reusable `paste_id` or an explicit title the interaction is
    /// asked for one; dismissing the prompt cancels without any request.
    pub async fn publish_paste(&self, path: &Path, options: PasteOptions) -> Result<PublishOutcome> {
        Self::ensure_enabled(TargetKind::Pastebin, self.settings.paste.enabled)?;

        let content = self.store.read(path)?;
        let document = Document::parse(&content)?;
        let previous_id = document.frontmatter.get_str("paste_id");
        let previous_listed = document.frontmatter.get_bool("listed").unwrap_or(false);
        let reusable_id = previous_id
            .clone()
            .filter(|id| is_reusable_paste_slug(id));

        let (title, listed) = match (options.title, reusable_id) {
            (Some(title), _) => (title, options.listed.unwrap_or(previous_listed)),
            (None, Some(id)) => (id, options.listed.unwrap_or(previous_listed)),
            (None, None) => {
                let default_title = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let Some(details) = self
                    .interaction
                    .paste_details(&default_title, options.listed.unwrap_or(false))
                else {
                    info!("Paste publish cancelled");
                    return Ok(PublishOutcome::Cancelled);
                };
                (details.title, details.listed)
            }
        };

        let slug = slugify_paste_title(&title);
        if slug.is_empty() {
            return Err(Error::InvalidInput(format!(
                "paste title `{title}` has no letters or digits"
            )));
        }

        let draft = PasteDraft {
            slug,
            content: document.body.trim().to_string(),
            listed,
        };
        let previous = previous_id.map(|id| PreviousPaste {
            id,
            listed: previous_listed,
        });

        let result = match self.client.publish_paste(previous.as_ref(), &draft).await {
            Ok(result) => result,
            Err(error) => return Ok(self.document_failure(path, &error)),
        };

        let mut caveats: Vec<String> = result.caveat.into_iter().collect();
        if let Err(error) = reconcile_paste(self.store, path, &result.identity, listed, Local::now()) {
            warn!(path = %path.display(), "Failed to record paste in front-matter: {error}");
            caveats.push(format!("front-matter was not updated: {error}"));
        }

        let message = if listed {
            "Paste published (listed)"
        } else {
            "Paste published (unlisted)"
        };
        Ok(self.finish(
            TargetKind::Pastebin,
            result.identity,
            result.updated,
            message,
            (!caveats.is_empty()).then(|| caveats.join("; ")),
        ))
    }

    /// Delete the paste recorded in `path` and clear its front-matter keys.
    pub async fn delete_paste(&self, path: &Path) -> Result<()> {
        Self::ensure_enabled(TargetKind::Pastebin, self.settings.paste.enabled)?;

        let content = self.store.read(path)?;
        let document = Document::parse(&content)?;
        let Some(paste_id) = document.frontmatter.get_str("paste_id") else {
            return Err(Error::InvalidInput(format!(
                "{} has no paste_id to delete",
                path.display()
            )));
        };

        self.client.delete_paste(&paste_id).await?;
        match clear_paste(self.store, path) {
            Ok(()) => self.interaction.notify(Notice::Success(format!(
                "Paste `{paste_id}` deleted and metadata cleared"
            ))),
            Err(error) => {
                warn!(path = %path.display(), "Failed to clear paste front-matter: {error}");
                self.interaction.notify(Notice::Degraded {
                    message: format!("Paste `{paste_id}` deleted"),
                    caveat: format!("front-matter was not cleared: {error}"),
                });
            }
        }
        Ok(())
    }

    /// Upload one picture file with its metadata.
    pub async fn upload_picture(&self, path: &Path, upload: PicUpload) -> Result<PublishOutcome> {
        Self::ensure_enabled(TargetKind::Pics, self.settings.pics.enabled)?;
        ensure_image(path)?;

        match self.upload_one(path, &upload, "").await? {
            Ok(uploaded) => {
                let message = format!("Uploaded {} to {}", path.display(), uploaded.url);
                Ok(self.finish(TargetKind::Pics, uploaded.identity, false, &message, uploaded.caveat))
            }
            Err(error) => Ok(self.document_failure(path, &error)),
        }
    }

    /// Upload the `![[...]]` embeds of a note and replace them with links.
    ///
    /// Items go one at a time and the note is rewritten once at the end.
    pub async fn upload_embeds(&self, note: &Path, scope: EmbedScope) -> Result<EmbedReport> {
        Self::ensure_enabled(TargetKind::Pics, self.settings.pics.enabled)?;

        let content = self.store.read(note)?;
        let embeds = find_embeds(&content, scope);
        let mut report = EmbedReport::default();
        if embeds.is_empty() {
            self.interaction
                .notify(Notice::Info("No image embeds found".to_string()));
            return Ok(report);
        }

        let note_label = note
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let upload = PicUpload::default();
        let mut replacements = Vec::new();
        let mut caveats = Vec::new();

        for (index, (embed, target)) in embeds.iter().enumerate() {
            self.interaction.progress(index + 1, embeds.len(), target);

            let Some(path) = self.resolve_embed(note, target) else {
                warn!(embed = %target, "Embedded file not found");
                report.failed.push(target.clone());
                continue;
            };
            if ensure_image(&path).is_err() {
                report.failed.push(target.clone());
                continue;
            }

            match self.upload_one(&path, &upload, &note_label).await {
                Ok(Ok(uploaded)) => {
                    replacements.push((embed.clone(), format!("![{}]({})", uploaded.alt_text, uploaded.url)));
                    caveats.extend(uploaded.caveat);
                    report.uploaded.push(uploaded.identity);
                }
                Ok(Err(error)) => {
                    warn!(embed = %target, "Upload failed: {error}");
                    report.failed.push(target.clone());
                }
                Err(error) => {
                    warn!(embed = %target, "Could not read embedded file: {error}");
                    report.failed.push(target.clone());
                }
            }
        }

        if !replacements.is_empty() {
            if let Err(error) = self.link_uploaded_embeds(note, &replacements) {
                warn!(note = %note.display(), "Failed to link uploaded embeds: {error}");
                caveats.push(format!("{} was not updated: {error}", note.display()));
            }
        }

        let uploaded = report.uploaded.len();
        if report.failed.is_empty() && caveats.is_empty() {
            self.interaction
                .notify(Notice::Success(format!("Uploaded {uploaded} image(s)")));
        } else if uploaded > 0 {
            let mut problems = caveats;
            if !report.failed.is_empty() {
                problems.push(format!("failed: {}", report.failed.join(", ")));
            }
            self.interaction.notify(Notice::Degraded {
                message: format!("Uploaded {uploaded} image(s)"),
                caveat: problems.join("; "),
            });
        } else {
            self.interaction.notify(Notice::Failure {
                target: TargetKind::Pics,
                message: format!("No images uploaded; failed: {}", report.failed.join(", ")),
                saved_to: None,
            });
        }
        Ok(report)
    }

    fn link_uploaded_embeds(&self, note: &Path, replacements: &[(String, String)]) -> Result<()> {
        let mut updated = self.store.read(note)?;
        for (embed, replacement) in replacements {
            updated = updated.replace(embed.as_str(), replacement);
        }
        self.store.write(note, &updated)
    }

    /// Replace the metadata of an uploaded picture.
    pub async fn edit_picture(&self, pic_id: &str, metadata: &PicMetadata) -> Result<()> {
        Self::ensure_enabled(TargetKind::Pics, self.settings.pics.enabled)?;
        self.client.update_picture(pic_id, metadata).await?;
        self.interaction
            .notify(Notice::Success(format!("Metadata for `{pic_id}` updated")));
        Ok(())
    }

    pub async fn fetch_picture(&self, pic_id: &str) -> Result<PictureInfo> {
        Ok(self.client.fetch_picture(pic_id).await?)
    }

    /// Upload, describe, log and optionally delete one picture.
    ///
    /// The outer `Result` is a local failure before anything was sent; the
    /// inner one is the primary upload call.
    async fn upload_one(
        &self,
        path: &Path,
        upload: &PicUpload,
        source_note: &str,
    ) -> Result<std::result::Result<UploadedPicture, PublishError>> {
        let settings = &self.settings.pics;
        let bytes = self.store.read_bytes(path)?;
        let tags = upload
            .tags
            .clone()
            .unwrap_or_else(|| settings.default_tags.clone());

        let identity = match self.client.upload_picture(&bytes, &tags).await {
            Ok(identity) => identity,
            Err(error) => return Ok(Err(error)),
        };
        let url = identity.url.clone().unwrap_or_default();
        let pic_id = identity.remote_id.clone().unwrap_or_default();
        let label = file_stem(&path.to_string_lossy()).to_string();

        let alt_text = match upload.alt_text.as_deref().map(str::trim) {
            Some(alt_text) if !alt_text.is_empty() => alt_text.to_string(),
            _ => {
                generate_alt_text(
                    self.client.transport(),
                    settings.openai_api_key.as_deref(),
                    &url,
                    &label,
                )
                .await
            }
        };

        let metadata = PicMetadata {
            description: upload.description.clone(),
            alt_text: alt_text.clone(),
            tags,
            public: upload.public,
        };
        let caveat = match self.client.update_picture(&pic_id, &metadata).await {
            Ok(()) => None,
            Err(error) => {
                warn!(pic_id = %pic_id, "Metadata update failed: {error}");
                Some(format!("metadata for `{label}` was not saved: {error}"))
            }
        };

        if settings.maintain_log {
            let entry = LogEntry {
                original_label: label.clone(),
                remote_url: url.clone(),
                source_document_label: source_note.to_string(),
                published_at: Local::now(),
                captured_at: capture_time(&bytes),
            };
            if let Err(error) = append_pic_log(self.store, settings, &entry) {
                warn!("Failed to update picture log: {error}");
            }
        }

        if settings.delete_after_upload {
            if let Err(error) = self.store.remove(path) {
                warn!(path = %path.display(), "Failed to delete uploaded file: {error}");
            }
        }

        Ok(Ok(UploadedPicture {
            identity,
            url,
            alt_text,
            caveat,
        }))
    }

    /// Embed target resolved as vault-relative path, next to the note, or by name.
    fn resolve_embed(&self, note: &Path, target: &str) -> Option<PathBuf> {
        let direct = PathBuf::from(target);
        if self.store.exists(&direct) {
            return Some(direct);
        }
        if let Some(folder) = note.parent() {
            let sibling = folder.join(target);
            if self.store.exists(&sibling) {
                return Some(sibling);
            }
        }
        let name = Path::new(target).file_name()?.to_string_lossy().into_owned();
        self.store.find_by_name(&name)
    }

    /// Failure of a document-backed target: the document itself still holds the content.
    fn document_failure(&self, path: &Path, error: &PublishError) -> PublishOutcome {
        warn!(path = %path.display(), "Publish failed: {error}");
        self.interaction.notify(Notice::Failure {
            target: error.target,
            message: format!(
                "Failed to publish {}: {error}. The content is unchanged in that document.",
                path.display()
            ),
            saved_to: Some(path.to_path_buf()),
        });
        PublishOutcome::SavedLocally {
            target: error.target,
            local_path: path.to_path_buf(),
            reason: error.to_string(),
        }
    }

    fn finish(
        &self,
        target: TargetKind,
        identity: RemoteIdentity,
        updated: bool,
        message: &str,
        caveat: Option<String>,
    ) -> PublishOutcome {
        match caveat {
            Some(caveat) => {
                self.interaction.notify(Notice::Degraded {
                    message: message.to_string(),
                    caveat: caveat.clone(),
                });
                PublishOutcome::Degraded {
                    target,
                    identity,
                    caveat,
                }
            }
            None => {
                self.interaction.notify(Notice::Success(message.to_string()));
                PublishOutcome::Published {
                    target,
                    identity,
                    updated,
                }
            }
        }
    }
}

fn ensure_image(path: &Path) -> Result<()> {
    let is_image = mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE);
    if is_image {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} is not an image file",
            path.display()
        )))
    }
}

/// Distinct `(embed, target)` pairs in document order. `![[file|alias]]`
/// resolves `file`.
fn find_embeds(content: &str, scope: EmbedScope) -> Vec<(String, String)> {
    let text = match scope {
        EmbedScope::All => content,
        EmbedScope::Line(line) => match line.checked_sub(1).and_then(|index| content.lines().nth(index)) {
            Some(line) => line,
            None => return Vec::new(),
        },
    };

    let mut seen = HashSet::new();
    embed_pattern()
        .captures_iter(text)
        .filter_map(|captures| {
            let embed = captures.get(0)?.as_str().to_string();
            let target = captures.get(1)?.as_str();
            let target = target.split('|').next().unwrap_or(target).trim().to_string();
            (!target.is_empty() && seen.insert(embed.clone())).then_some((embed, target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use reqwest::Method;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::client::testing::RecordingTransport;
    use crate::frontmatter::{split_document, Frontmatter};
    use crate::notify::testing::RecordingInteraction;
    use crate::notify::PasteDetails;
    use crate::store::testing::FaultyStore;
    use crate::store::FsDocumentStore;

    struct Harness {
        _dir: TempDir,
        store: FsDocumentStore,
        transport: RecordingTransport,
        interaction: RecordingInteraction,
        settings: Settings,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let store = FsDocumentStore::new(dir.path());
            let mut settings = Settings::default();
            settings.pics.enabled = true;
            Self {
                _dir: dir,
                store,
                transport: RecordingTransport::new(),
                interaction: RecordingInteraction::default(),
                settings,
            }
        }

        fn publisher(
            &self,
        ) -> Publisher<'_, &RecordingTransport, FsDocumentStore, RecordingInteraction> {
            Publisher::new(
                &Account::new("foobar", "token"),
                &self.settings,
                &self.transport,
                &self.store,
                &self.interaction,
            )
            .unwrap()
        }

        fn frontmatter(&self, path: &str) -> Frontmatter {
            let content = self.store.read(Path::new(path)).unwrap();
            Frontmatter::parse(split_document(&content).unwrap().yaml).unwrap()
        }

        fn files(&self) -> Vec<String> {
            let mut files: Vec<String> = std::fs::read_dir(self.store.root())
                .unwrap()
                .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            files.sort();
            files
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn status_success_logs_and_notifies_once() {
        let mut harness = Harness::new();
        harness.settings.status.log_note_path = Some("status-log".to_string());
        harness.transport.respond_json(
            200,
            json!({"response": {"url": "https://foobar.status.lol/1"}}),
        );

        let outcome = harness
            .publisher()
            .post_status("🎉 launch day", None)
            .await
            .unwrap();

        assert!(outcome.is_success());
        let log = harness.store.read(Path::new("status-log.md")).unwrap();
        assert!(log.contains("- 🎉 launch day"));
        assert_eq!(harness.interaction.terminal_notices().len(), 1);
        let body = harness.transport.requests()[0].body.as_json().unwrap().clone();
        assert_eq!(body["emoji"], json!("🎉"));
        assert_eq!(body["content"], json!("launch day"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn status_network_failure_writes_one_fallback_and_touches_nothing_else() {
        let harness = Harness::new();
        let note = "---\ntitle: Keep me\n---\n\nBody\n";
        harness.store.write(Path::new("note.md"), note).unwrap();
        harness.transport.respond_network_error("connection reset");

        let outcome = harness
            .publisher()
            .post_status("  lost words  ", None)
            .await
            .unwrap();

        let PublishOutcome::SavedLocally { local_path, .. } = outcome else {
            panic!("expected a local fallback, got {outcome:?}");
        };
        let fallbacks: Vec<String> = harness
            .files()
            .into_iter()
            .filter(|name| name.starts_with("Failed Status - "))
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(
            harness.store.read(&local_path).unwrap(),
            "Failed to post:\n\n  lost words  "
        );
        assert_eq!(harness.store.read(Path::new("note.md")).unwrap(), note);

        let notices = harness.interaction.terminal_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            &notices[0],
            Notice::Failure { saved_to: Some(path), .. } if *path == local_path
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn disabled_target_is_a_configuration_error_without_requests() {
        let mut harness = Harness::new();
        harness.settings.status.enabled = false;

        let error = harness.publisher().post_status("hi", None).await.unwrap_err();
        assert!(matches!(error, Error::Configuration(_)));
        assert!(harness.transport.requests().is_empty());
    }

    #[test]
    fn missing_address_fails_before_any_request() {
        let harness = Harness::new();
        let result = Publisher::new(
            &Account::new("", "token"),
            &harness.settings,
            &harness.transport,
            &harness.store,
            &harness.interaction,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn weblog_publish_reconciles_renames_and_then_updates_in_place() {
        let harness = Harness::new();
        harness
            .store
            .write(
                Path::new("draft.md"),
                "---\ntitle: Hello World\nstatus: published\ndate: 2024-05-01\ntags: rust, cli\nauthor: me\n---\nFirst paragraph.\n",
            )
            .unwrap();
        let response = json!({"response": {"entry": {"entry": "e1", "slug": "hello-world"}}});
        harness.transport.respond_json(200, response.clone());
        harness.transport.respond_json(200, response);

        let first = harness
            .publisher()
            .publish_weblog(Path::new("draft.md"))
            .await
            .unwrap();
        assert!(matches!(first, PublishOutcome::Published { updated: false, .. }));
        assert!(!harness.store.exists(Path::new("draft.md")));

        let renamed = "2024-05-01_hello-world.md";
        let fm = harness.frontmatter(renamed);
        assert_eq!(fm.get_str("entry").as_deref(), Some("e1"));
        assert_eq!(fm.get_str("slug").as_deref(), Some("hello-world"));
        assert_eq!(fm.get_str("author").as_deref(), Some("me"));

        let second = harness
            .publisher()
            .publish_weblog(Path::new(renamed))
            .await
            .unwrap();
        assert!(matches!(second, PublishOutcome::Published { updated: true, .. }));

        let requests = harness.transport.requests();
        assert_eq!(
            requests[0].url,
            "https://api.omg.lol/address/foobar/weblog/entry"
        );
        assert_eq!(
            requests[1].url,
            "https://api.omg.lol/address/foobar/weblog/entry/e1"
        );
        assert_eq!(
            requests[0].body.as_text().unwrap(),
            "Title: Hello World\nSlug: hello-world\nDate: 2024-05-01\nStatus: published\nTags: rust, cli\n\nFirst paragraph."
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn weblog_pages_keep_their_file_name_by_default() {
        let harness = Harness::new();
        harness
            .store
            .write(
                Path::new("about.md"),
                "---\ntitle: About\ntype: page\nstatus: published\n---\nAbout me.\n",
            )
            .unwrap();
        harness
            .transport
            .respond_json(200, json!({"response": {"entry": {"entry": "p1", "slug": "about"}}}));

        harness
            .publisher()
            .publish_weblog(Path::new("about.md"))
            .await
            .unwrap();

        assert_eq!(harness.frontmatter("about.md").get_str("entry").as_deref(), Some("p1"));
        let body = harness.transport.requests()[0].body.as_text().unwrap().to_string();
        assert!(body.contains("Type: page\n"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn weblog_requires_publishable_status() {
        let harness = Harness::new();
        harness
            .store
            .write(Path::new("idea.md"), "---\ntitle: Idea\n---\nBody")
            .unwrap();

        let error = harness
            .publisher()
            .publish_weblog(Path::new("idea.md"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(harness.transport.requests().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn weblog_rejection_leaves_document_untouched() {
        let harness = Harness::new();
        let original = "---\nstatus: draft\n---\nBody\n";
        harness.store.write(Path::new("post.md"), original).unwrap();
        harness
            .transport
            .respond_json(500, json!({"response": {"message": "oops"}}));

        let outcome = harness
            .publisher()
            .publish_weblog(Path::new("post.md"))
            .await
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::SavedLocally { .. }));
        assert_eq!(harness.store.read(Path::new("post.md")).unwrap(), original);
        assert_eq!(harness.interaction.terminal_notices().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn weblog_front_matter_write_failure_is_degraded_success() {
        let dir = tempdir().unwrap();
        let mut store = FaultyStore::new(dir.path());
        let original = "---\ntitle: Hello\nstatus: published\n---\nBody\n";
        store.inner.write(Path::new("draft.md"), original).unwrap();
        store.fail_writes = true;

        let transport = RecordingTransport::new();
        transport.respond_json(200, json!({"response": {"entry": {"entry": "e1", "slug": "hello"}}}));
        let interaction = RecordingInteraction::default();
        let settings = Settings::default();
        let publisher = Publisher::new(
            &Account::new("foobar", "token"),
            &settings,
            &transport,
            &store,
            &interaction,
        )
        .unwrap();

        let outcome = publisher.publish_weblog(Path::new("draft.md")).await.unwrap();
        assert!(matches!(
            &outcome,
            PublishOutcome::Degraded { target: TargetKind::Weblog, caveat, .. }
                if caveat.contains("front-matter was not updated")
        ));
        assert_eq!(store.inner.read(Path::new("draft.md")).unwrap(), original);

        let notices = interaction.terminal_notices();
        assert_eq!(notices.len(), 1);
        assert!(matches!(&notices[0], Notice::Degraded { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn new_paste_prompts_and_cancel_sends_nothing() {
        let harness = Harness::new();
        harness.store.write(Path::new("snippet.md"), "echo hi\n").unwrap();

        let outcome = harness
            .publisher()
            .publish_paste(Path::new("snippet.md"), PasteOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::Cancelled);
        assert!(harness.transport.requests().is_empty());
        assert_eq!(
            harness.interaction.prompts.lock().unwrap().clone(),
            vec![("snippet".to_string(), false)]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn paste_is_created_then_reused_without_prompting() {
        let mut harness = Harness::new();
        harness.interaction = RecordingInteraction::answering(Some(PasteDetails {
            title: "My Snippet".to_string(),
            listed: false,
        }));
        harness.store.write(Path::new("snippet.md"), "echo hi\n").unwrap();
        let response = json!({"response": {"paste": {"id": "my-snippet", "url": "https://foobar.paste.lol/my-snippet"}}});
        harness.transport.respond_json(200, response.clone());
        harness.transport.respond_json(200, response);

        let publisher = harness.publisher();
        let first = publisher
            .publish_paste(Path::new("snippet.md"), PasteOptions::default())
            .await
            .unwrap();
        let second = publisher
            .publish_paste(Path::new("snippet.md"), PasteOptions::default())
            .await
            .unwrap();

        assert!(matches!(first, PublishOutcome::Published { updated: false, .. }));
        assert!(matches!(second, PublishOutcome::Published { updated: true, .. }));
        assert_eq!(harness.interaction.prompts.lock().unwrap().len(), 1);
        assert_eq!(first.identity(), second.identity());

        let fm = harness.frontmatter("snippet.md");
        assert_eq!(fm.get_str("paste_id").as_deref(), Some("my-snippet"));
        assert_eq!(fm.get_bool("listed"), Some(false));
        assert_eq!(
            harness.transport.requests()[0].body.as_json().unwrap(),
            &json!({"title": "my-snippet", "content": "echo hi"})
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn paste_visibility_change_survives_failed_delete() {
        let harness = Harness::new();
        harness
            .store
            .write(
                Path::new("snippet.md"),
                "---\npaste_id: snippet\npaste_url: https://foobar.paste.lol/snippet\nlisted: false\n---\n\necho hi\n",
            )
            .unwrap();
        harness
            .transport
            .respond_network_error("connection reset")
            .respond_json(200, json!({"response": {"paste": {"id": "snippet"}}}));

        let outcome = harness
            .publisher()
            .publish_paste(
                Path::new("snippet.md"),
                PasteOptions {
                    listed: Some(true),
                    ..PasteOptions::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::Degraded { .. }));
        let calls = harness.transport.calls();
        assert_eq!(calls[0].0, Method::DELETE);
        assert_eq!(calls[1].0, Method::POST);
        assert_eq!(harness.frontmatter("snippet.md").get_bool("listed"), Some(true));
        assert!(matches!(
            harness.interaction.terminal_notices().as_slice(),
            [Notice::Degraded { .. }]
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_paste_clears_metadata() {
        let harness = Harness::new();
        harness
            .store
            .write(
                Path::new("snippet.md"),
                "---\ntitle: Keep\npaste_id: snippet\nlisted: true\n---\n\necho hi\n",
            )
            .unwrap();
        harness
            .transport
            .respond_json(200, json!({"response": {"message": "deleted"}}));

        harness
            .publisher()
            .delete_paste(Path::new("snippet.md"))
            .await
            .unwrap();

        assert_eq!(
            harness.store.read(Path::new("snippet.md")).unwrap(),
            "---\ntitle: Keep\n---\n\necho hi\n"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn embeds_upload_sequentially_and_rewrite_once() {
        let mut harness = Harness::new();
        harness.settings.pics.maintain_log = true;
        harness.store.create_dir_all(Path::new("attachments")).unwrap();
        harness.store.write(Path::new("attachments/a.png"), "a").unwrap();
        harness.store.write(Path::new("b.jpg"), "b").unwrap();
        harness
            .store
            .write(
                Path::new("trip.md"),
                "Day one ![[a.png]]\n\n![[b.jpg|beach]] and ![[missing.png]]\n",
            )
            .unwrap();
        harness
            .transport
            .respond_json(200, json!({"response": {"id": "a1", "url": "https://cdn.some.pics/foobar/a1.png"}}))
            .respond_json(200, json!({"response": {"message": "ok"}}))
            .respond_json(200, json!({"response": {"id": "b1", "url": "https://cdn.some.pics/foobar/b1.jpg"}}))
            .respond_json(200, json!({"response": {"message": "ok"}}));

        let report = harness
            .publisher()
            .upload_embeds(Path::new("trip.md"), EmbedScope::All)
            .await
            .unwrap();

        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.failed, vec!["missing.png".to_string()]);
        assert_eq!(
            harness.store.read(Path::new("trip.md")).unwrap(),
            "Day one ![a](https://cdn.some.pics/foobar/a1.png)\n\n![b](https://cdn.some.pics/foobar/b1.jpg) and ![[missing.png]]\n"
        );
        assert_eq!(
            harness.interaction.progress.lock().unwrap().clone(),
            vec![(1, 3), (2, 3), (3, 3)]
        );
        let log = harness.store.read(Path::new("_pics-upload-log.md")).unwrap();
        assert!(log.contains("| a | [[trip]] |"));
        assert!(log.contains("| b | [[trip]] |"));
        assert!(matches!(
            harness.interaction.terminal_notices().as_slice(),
            [Notice::Degraded { .. }]
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn picture_metadata_failure_is_degraded_success() {
        let harness = Harness::new();
        harness.store.write(Path::new("cat.png"), "png").unwrap();
        harness
            .transport
            .respond_json(200, json!({"response": {"id": "c1", "url": "https://cdn.some.pics/foobar/c1.png"}}))
            .respond_json(500, json!({"response": {"message": "nope"}}));

        let outcome = harness
            .publisher()
            .upload_picture(
                Path::new("cat.png"),
                PicUpload {
                    description: "A cat".to_string(),
                    ..PicUpload::default()
                },
            )
            .await
            .unwrap();

        let PublishOutcome::Degraded { identity, .. } = outcome else {
            panic!("expected degraded success, got {outcome:?}");
        };
        assert_eq!(identity.remote_id.as_deref(), Some("c1"));
        let update = &harness.transport.requests()[1];
        assert_eq!(update.method, Method::PUT);
        assert_eq!(
            update.body.as_json().unwrap(),
            &json!({
                "description": "A cat",
                "alt_text": "cat",
                "tags": "omgPublish",
                "hide_from_public": true,
            })
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn non_images_are_rejected_before_upload() {
        let harness = Harness::new();
        harness.store.write(Path::new("notes.txt"), "text").unwrap();

        let error = harness
            .publisher()
            .upload_picture(Path::new("notes.txt"), PicUpload::default())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(harness.transport.requests().is_empty());
    }

    #[test]
    fn find_embeds_respects_line_scope_and_dedupes() {
        let content = "![[a.png]] ![[a.png]]\nsecond ![[b.png|alt]]\n";
        assert_eq!(
            find_embeds(content, EmbedScope::All),
            vec![
                ("![[a.png]]".to_string(), "a.png".to_string()),
                ("![[b.png|alt]]".to_string(), "b.png".to_string()),
            ]
        );
        assert_eq!(
            find_embeds(content, EmbedScope::Line(2)),
            vec![("![[b.png|alt]]".to_string(), "b.png".to_string())]
        );
        assert!(find_embeds(content, EmbedScope::Line(0)).is_empty());
        assert!(find_embeds(content, EmbedScope::Line(9)).is_empty());
    }
}
