//! Request bodies and addresses for every publish target.
//!
//! Everything here is pure: the builder never performs I/O and never reads
//! ambient state. It refuses to exist without a usable account, so no request
//! is ever addressed to an empty username.

use base64::Engine as _;
use reqwest::Method;
use serde_json::{json, Value};

use crate::config::{Account, StatusSettings};
use crate::models::{ContentItem, PasteDraft, PicMetadata, TargetKind, WeblogDraft};
use crate::Result;

/// Entry type the weblog assumes when the `Type` line is absent.
pub const DEFAULT_ENTRY_TYPE: &str = "post";

/// A fully addressed request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub target: TargetKind,
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Sent as `text/plain`
    Text(String),
}

impl RequestBody {
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Builds requests for one account.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    address: String,
}

impl RequestBuilder {
    /// Fails with a configuration error when the address or token is empty.
    pub fn new(account: &Account) -> Result<Self> {
        account.validate()?;
        Ok(Self {
            base_url: account.normalized_base_url(),
            address: account.normalized_address(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, target: TargetKind, suffix: &str) -> String {
        format!(
            "{}/address/{}/{}{}",
            self.base_url,
            urlencoding::encode(&self.address),
            target.collection_path(),
            suffix
        )
    }

    /// `POST statuses/` with `{content, emoji, skip_mastodon_post}`.
    pub fn status(&self, item: &ContentItem, settings: &StatusSettings) -> ApiRequest {
        self.status_with_mastodon(item, settings.skip_mastodon_post)
    }

    /// Same as [`Self::status`] with an explicit cross-post choice.
    pub fn status_with_mastodon(&self, item: &ContentItem, skip_mastodon_post: bool) -> ApiRequest {
        let emoji = item.prefix.clone().unwrap_or_default();
        ApiRequest {
            target: TargetKind::Status,
            method: Method::POST,
            url: self.url(TargetKind::Status, "/"),
            body: RequestBody::Json(json!({
                "content": item.body,
                "emoji": emoji,
                "skip_mastodon_post": skip_mastodon_post,
            })),
        }
    }

    /// `POST weblog/entry` for a new entry, `POST weblog/entry/{id}` to update.
    pub fn weblog(&self, draft: &WeblogDraft, entry_id: Option<&str>) -> ApiRequest {
        let suffix = entry_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(String::new, |id| format!("/{}", urlencoding::encode(id)));

        ApiRequest {
            target: TargetKind::Weblog,
            method: Method::POST,
            url: self.url(TargetKind::Weblog, &suffix),
            body: RequestBody::Text(weblog_body(draft)),
        }
    }

    /// `POST pastebin/`. The service upserts by title, so this is also the update call.
    pub fn paste(&self, draft: &PasteDraft) -> ApiRequest {
        let mut body = json!({
            "title": draft.slug,
            "content": draft.content.trim(),
        });
        // Absence means unlisted; `listed: false` is never sent.
        if draft.listed {
            body["listed"] = Value::Bool(true);
        }

        ApiRequest {
            target: TargetKind::Pastebin,
            method: Method::POST,
            url: self.url(TargetKind::Pastebin, "/"),
            body: RequestBody::Json(body),
        }
    }

    pub fn paste_delete(&self, paste_id: &str) -> ApiRequest {
        ApiRequest {
            target: TargetKind::Pastebin,
            method: Method::DELETE,
            url: self.url(
                TargetKind::Pastebin,
                &format!("/{}", urlencoding::encode(paste_id.trim())),
            ),
            body: RequestBody::Empty,
        }
    }

    /// Step one of a picture upload: the binary as base64 plus tags.
    pub fn pic_upload(&self, bytes: &[u8], tags: &str) -> ApiRequest {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        ApiRequest {
            target: TargetKind::Pics,
            method: Method::POST,
            url: self.url(TargetKind::Pics, "/upload"),
            body: RequestBody::Json(json!({
                "pic": encoded,
                "tags": tags,
            })),
        }
    }

    /// Step two of a picture upload, also used for metadata edits.
    pub fn pic_update(&self, pic_id: &str, metadata: &PicMetadata) -> ApiRequest {
        let mut body = json!({
            "description": metadata.description,
            "alt_text": metadata.alt_text,
            "tags": metadata.tags,
        });
        if !metadata.public {
            body["hide_from_public"] = Value::Bool(true);
        }

        ApiRequest {
            target: TargetKind::Pics,
            method: Method::PUT,
            url: self.url(
                TargetKind::Pics,
                &format!("/{}", urlencoding::encode(pic_id.trim())),
            ),
            body: RequestBody::Json(body),
        }
    }

    pub fn pic_fetch(&self, pic_id: &str) -> ApiRequest {
        ApiRequest {
            target: TargetKind::Pics,
            method: Method::GET,
            url: self.url(
                TargetKind::Pics,
                &format!("/{}", urlencoding::encode(pic_id.trim())),
            ),
            body: RequestBody::Empty,
        }
    }
}

/// Flat `Key: value` header block, a blank line, then the body.
///
/// Line order is fixed: `Title`, `Slug`, `Date`, `Type`, `Status`, `Tags`.
/// `Title` is omitted when empty and `Type` when it is the default `post`.
pub fn weblog_body(draft: &WeblogDraft) -> String {
    let mut text = String::new();

    let title = draft.title.trim();
    if !title.is_empty() {
        text.push_str(&format!("Title: {title}\n"));
    }
    text.push_str(&format!("Slug: {}\n", draft.slug));
    text.push_str(&format!("Date: {}\n", draft.date));

    if let Some(entry_type) = draft
        .entry_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(DEFAULT_ENTRY_TYPE))
    {
        text.push_str(&format!("Type: {entry_type}\n"));
    }
    if let Some(status) = draft
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        text.push_str(&format!("Status: {status}\n"));
    }
    if !draft.tags.is_empty() {
        text.push_str(&format!("Tags: {}\n", draft.tags.join(", ")));
    }

    text.push('\n');
    text.push_str(&draft.body);
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extract::extract_status;
    use crate::Error;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(&Account::new("@foobar", "token")).unwrap()
    }

    #[test]
    fn builder_fails_fast_without_address() {
        let error = RequestBuilder::new(&Account::new("", "token")).unwrap_err();
        assert!(matches!(error, Error::Configuration(_)));
    }

    #[test]
    fn status_request_carries_prefix_and_mastodon_flag() {
        let item = extract_status("🎉 shipped it", "💬");
        let request = builder().status(&item, &StatusSettings::default());

        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.url,
            "https://api.omg.lol/address/foobar/statuses/"
        );
        assert_eq!(
            request.body,
            RequestBody::Json(json!({
                "content": "shipped it",
                "emoji": "🎉",
                "skip_mastodon_post": true,
            }))
        );
    }

    #[test]
    fn weblog_body_uses_fixed_line_order() {
        let draft = WeblogDraft {
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            date: "2024-05-01".to_string(),
            entry_type: Some("page".to_string()),
            status: Some("draft".to_string()),
            tags: vec!["rust".to_string(), "cli".to_string()],
            body: "Body text".to_string(),
        };
        assert_eq!(
            weblog_body(&draft),
            "Title: Hello\nSlug: hello\nDate: 2024-05-01\nType: page\nStatus: draft\nTags: rust, cli\n\nBody text"
        );
    }

    #[test]
    fn weblog_body_skips_default_type_and_empty_title() {
        let draft = WeblogDraft {
            slug: "hello".to_string(),
            date: "2024-05-01".to_string(),
            entry_type: Some("Post".to_string()),
            body: "Body".to_string(),
            ..WeblogDraft::default()
        };
        assert_eq!(weblog_body(&draft), "Slug: hello\nDate: 2024-05-01\n\nBody");
    }

    #[test]
    fn weblog_update_addresses_existing_entry() {
        let draft = WeblogDraft::default();
        let builder = builder();
        assert_eq!(
            builder.weblog(&draft, None).url,
            "https://api.omg.lol/address/foobar/weblog/entry"
        );
        assert_eq!(
            builder.weblog(&draft, Some("abc123")).url,
            "https://api.omg.lol/address/foobar/weblog/entry/abc123"
        );
    }

    #[test]
    fn paste_omits_listed_unless_true() {
        let mut draft = PasteDraft {
            slug: "notes".to_string(),
            content: "  body  \n".to_string(),
            listed: false,
        };
        let body = builder().paste(&draft).body;
        assert_eq!(body, RequestBody::Json(json!({"title": "notes", "content": "body"})));

        draft.listed = true;
        let body = builder().paste(&draft).body;
        assert_eq!(body.as_json().unwrap()["listed"], Value::Bool(true));
    }

    #[test]
    fn pic_update_hides_from_public_by_default() {
        let builder = builder();
        let mut metadata = PicMetadata {
            description: "A cat".to_string(),
            alt_text: "cat on a chair".to_string(),
            tags: "omgPublish".to_string(),
            public: false,
        };
        let request = builder.pic_update("pic1", &metadata);
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "https://api.omg.lol/address/foobar/pics/pic1");
        assert_eq!(
            request.body.as_json().unwrap()["hide_from_public"],
            Value::Bool(true)
        );

        metadata.public = true;
        let request = builder.pic_update("pic1", &metadata);
        assert!(request.body.as_json().unwrap().get("hide_from_public").is_none());
    }

    #[test]
    fn pic_upload_encodes_bytes_as_base64() {
        let request = builder().pic_upload(b"png", "omgPublish");
        assert_eq!(request.url, "https://api.omg.lol/address/foobar/pics/upload");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"pic": "cG5n", "tags": "omgPublish"}))
        );
    }
}
