//! Create-or-update calls and response envelope validation.

use serde_json::Value;
use tracing::{info, warn};

use super::{ApiRequest, ApiResponse, Transport};
use crate::config::Account;
use crate::error::{PublishError, PublishFailure};
use crate::models::{ContentItem, PasteDraft, PicMetadata, RemoteIdentity, TargetKind, WeblogDraft};
use crate::payload::RequestBuilder;
use crate::slug::is_reusable_paste_slug;
use crate::util::error_excerpt;
use crate::Result;

/// Paste state recorded in a document by an earlier publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousPaste {
    pub id: String,
    pub listed: bool,
}

/// Result of a pastebin publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteResult {
    pub identity: RemoteIdentity,
    /// The existing paste was updated in place
    pub updated: bool,
    /// Set when deleting the previous paste failed; the new paste is live anyway
    pub caveat: Option<String>,
}

/// Picture metadata as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureInfo {
    pub id: String,
    pub url: String,
    pub description: String,
    pub alt_text: String,
    pub tags: String,
    pub hidden: bool,
}

/// Client for every remote collection of one account.
#[derive(Debug)]
pub struct PublishClient<T> {
    transport: T,
    requests: RequestBuilder,
    token: String,
}

impl<T: Transport> PublishClient<T> {
    /// Fails with a configuration error when the account is incomplete.
    pub fn new(account: &Account, transport: T) -> Result<Self> {
        Ok(Self {
            transport,
            requests: RequestBuilder::new(account)?,
            token: account.token.trim().to_string(),
        })
    }

    pub const fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Post a status. Success requires `response.url`.
    pub async fn post_status(
        &self,
        item: &ContentItem,
        skip_mastodon_post: bool,
    ) -> std::result::Result<RemoteIdentity, PublishError> {
        let request = self.requests.status_with_mastodon(item, skip_mastodon_post);
        let envelope = self.marked_envelope(&request).await?;
        let url = required_str(&envelope, TargetKind::Status, TargetKind::Status.success_marker())?;
        let id = scalar_text(envelope.get("id"));

        info!(url = %url, "Status posted");
        Ok(RemoteIdentity::new(id, String::new(), Some(url)))
    }

    /// Create a weblog entry, or update it in place when `entry_id` is set.
    pub async fn publish_weblog(
        &self,
        draft: &WeblogDraft,
        entry_id: Option<&str>,
    ) -> std::result::Result<RemoteIdentity, PublishError> {
        let request = self.requests.weblog(draft, entry_id);
        let envelope = self.marked_envelope(&request).await?;
        let entry = envelope
            .get(TargetKind::Weblog.success_marker())
            .filter(|entry| entry.is_object())
            .ok_or_else(|| malformed(TargetKind::Weblog, "response.entry"))?;

        let remote_id = scalar_text(entry.get("entry"))
            .or_else(|| scalar_text(entry.get("id")))
            .or_else(|| entry_id.map(ToString::to_string));
        let slug = scalar_text(entry.get("slug")).unwrap_or_else(|| draft.slug.clone());
        let url = scalar_text(entry.get("url")).or_else(|| {
            scalar_text(entry.get("location")).map(|location| {
                format!(
                    "https://{}.weblog.lol/{}",
                    self.requests.address(),
                    location.trim_start_matches('/')
                )
            })
        });

        info!(slug = %slug, updated = entry_id.is_some(), "Weblog entry published");
        Ok(RemoteIdentity::new(remote_id, slug, url))
    }

    /// Publish a paste, deciding between update, create, and delete-then-create.
    ///
    /// The service has no in-place visibility toggle, so a visibility change on
    /// a published paste deletes the old one first. That delete is best effort.
    pub async fn publish_paste(
        &self,
        previous: Option<&PreviousPaste>,
        draft: &PasteDraft,
    ) -> std::result::Result<PasteResult, PublishError> {
        let previous = previous.filter(|previous| !previous.id.trim().is_empty());
        let mut caveat = None;
        let mut updated = false;

        if let Some(previous) = previous {
            if previous.listed != draft.listed {
                if let Err(error) = self.delete_paste(&previous.id).await {
                    warn!(paste_id = %previous.id, "Failed to delete previous paste: {error}");
                    caveat = Some(format!(
                        "previous paste `{}` could not be deleted: {error}",
                        previous.id
                    ));
                }
            } else {
                updated = previous.id == draft.slug && is_reusable_paste_slug(&previous.id);
            }
        }

        let request = self.requests.paste(draft);
        let envelope = self.marked_envelope(&request).await?;
        let paste = envelope
            .get(TargetKind::Pastebin.success_marker())
            .filter(|paste| paste.is_object())
            .ok_or_else(|| malformed(TargetKind::Pastebin, "response.paste"))?;

        let id = scalar_text(paste.get("id"))
            .or_else(|| scalar_text(paste.get("title")))
            .unwrap_or_else(|| draft.slug.clone());
        let url = scalar_text(paste.get("url")).unwrap_or_else(|| {
            format!("https://{}.paste.lol/{}", self.requests.address(), draft.slug)
        });

        info!(paste_id = %id, listed = draft.listed, updated, "Paste published");
        Ok(PasteResult {
            identity: RemoteIdentity::new(Some(id.clone()), id, Some(url)),
            updated,
            caveat,
        })
    }

    pub async fn delete_paste(&self, paste_id: &str) -> std::result::Result<(), PublishError> {
        let request = self.requests.paste_delete(paste_id);
        self.execute(&request).await?;
        info!(paste_id = %paste_id, "Paste deleted");
        Ok(())
    }

    /// Upload picture bytes. Success requires `response.id` and `response.url`.
    pub async fn upload_picture(
        &self,
        bytes: &[u8],
        tags: &str,
    ) -> std::result::Result<RemoteIdentity, PublishError> {
        let request = self.requests.pic_upload(bytes, tags);
        let envelope = self.marked_envelope(&request).await?;
        let id = required_str(&envelope, TargetKind::Pics, TargetKind::Pics.success_marker())?;
        let url = required_str(&envelope, TargetKind::Pics, "url")?;

        info!(pic_id = %id, "Picture uploaded");
        Ok(RemoteIdentity::new(Some(id.clone()), id, Some(url)))
    }

    pub async fn update_picture(
        &self,
        pic_id: &str,
        metadata: &PicMetadata,
    ) -> std::result::Result<(), PublishError> {
        let request = self.requests.pic_update(pic_id, metadata);
        self.execute(&request).await?;
        Ok(())
    }

    /// Fetch picture metadata, rebuilding the CDN URL when the service omits it.
    pub async fn fetch_picture(&self, pic_id: &str) -> std::result::Result<PictureInfo, PublishError> {
        let request = self.requests.pic_fetch(pic_id);
        let envelope = self.envelope(&request).await?;
        let pic = envelope
            .get("pic")
            .filter(|pic| pic.is_object())
            .ok_or_else(|| malformed(TargetKind::Pics, "response.pic"))?;

        let id = scalar_text(pic.get("id")).unwrap_or_else(|| pic_id.to_string());
        let url = scalar_text(pic.get("url")).unwrap_or_else(|| {
            let address = scalar_text(pic.get("address"))
                .unwrap_or_else(|| self.requests.address().to_string());
            format!("https://cdn.some.pics/{address}/{id}.{}", picture_extension(pic))
        });
        let tags = match pic.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| scalar_text(Some(item)))
                .collect::<Vec<_>>()
                .join(", "),
            other => scalar_text(other).unwrap_or_default(),
        };

        Ok(PictureInfo {
            url,
            description: scalar_text(pic.get("description")).unwrap_or_default(),
            alt_text: scalar_text(pic.get("alt_text")).unwrap_or_default(),
            tags,
            hidden: pic
                .get("hide_from_public")
                .is_some_and(|value| value.as_bool().unwrap_or(false) || value.as_i64() == Some(1)),
            id,
        })
    }

    async fn execute(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, PublishError> {
        let response = self
            .transport
            .send(&self.token, request)
            .await
            .map_err(|error| PublishError::new(request.target, PublishFailure::Network(error)))?;

        if !response.is_success() {
            return Err(PublishError::new(
                request.target,
                PublishFailure::Rejected {
                    status: response.status,
                    body: error_excerpt(&response.body),
                },
            ));
        }
        Ok(response)
    }

    /// The `response` object of a successful call.
    async fn envelope(&self, request: &ApiRequest) -> std::result::Result<Value, PublishError> {
        let response = self.execute(request).await?;
        response
            .json()
            .and_then(|mut body| body.get_mut("response").map(Value::take))
            .filter(Value::is_object)
            .ok_or_else(|| malformed(request.target, "response"))
    }

    /// The `response` object of a publish call, which must carry the
    /// target's success marker.
    async fn marked_envelope(&self, request: &ApiRequest) -> std::result::Result<Value, PublishError> {
        let envelope = self.envelope(request).await?;
        let marker = request.target.success_marker();
        match envelope.get(marker) {
            None | Some(Value::Null) => Err(malformed(request.target, &format!("response.{marker}"))),
            Some(_) => Ok(envelope),
        }
    }
}

fn malformed(target: TargetKind, field: &str) -> PublishError {
    PublishError::new(target, PublishFailure::MalformedEnvelope(field.to_string()))
}

fn required_str(
    envelope: &Value,
    target: TargetKind,
    key: &str,
) -> std::result::Result<String, PublishError> {
    scalar_text(envelope.get(key)).ok_or_else(|| malformed(target, &format!("response.{key}")))
}

/// Non-empty string or number as text.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn picture_extension(pic: &Value) -> String {
    pic.get("exif")
        .and_then(|exif| scalar_text(exif.get("File Type Extension")))
        .or_else(|| {
            scalar_text(pic.get("mime"))
                .and_then(|mime| mime.split('/').nth(1).map(ToString::to_string))
        })
        .filter(|extension| !extension.is_empty())
        .map_or_else(|| "jpg".to_string(), |extension| extension.to_lowercase())
}
