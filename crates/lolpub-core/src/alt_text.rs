//! Optional generated alt text for uploaded pictures.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::warn;

use crate::client::{ApiRequest, RequestBody, Transport};
use crate::models::TargetKind;

pub const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ALT_TEXT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 50;

/// Request asking the model for a short alt text describing `image_url`.
pub fn alt_text_request(image_url: &str) -> ApiRequest {
    ApiRequest {
        target: TargetKind::Pics,
        method: Method::POST,
        url: CHAT_COMPLETIONS_URL.to_string(),
        body: RequestBody::Json(json!({
            "model": ALT_TEXT_MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an assistant that writes short, clear alt text for images.",
                },
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Write a short alt text for this image."},
                        {"type": "image_url", "image_url": {"url": image_url}},
                    ],
                },
            ],
            "max_tokens": MAX_TOKENS,
        })),
    }
}

/// Generated alt text, or `fallback` when no key is set or anything fails.
pub async fn generate_alt_text<T: Transport>(
    transport: &T,
    api_key: Option<&str>,
    image_url: &str,
    fallback: &str,
) -> String {
    let Some(api_key) = api_key.map(str::trim).filter(|key| !key.is_empty()) else {
        return fallback.to_string();
    };

    let response = match transport.send(api_key, &alt_text_request(image_url)).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            warn!(status = response.status, "Alt text generation rejected");
            return fallback.to_string();
        }
        Err(error) => {
            warn!("Alt text generation failed: {error}");
            return fallback.to_string();
        }
    };

    response
        .json()
        .as_ref()
        .and_then(|body| body.pointer("/choices/0/message/content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(|| fallback.to_string(), ToString::to_string)
}
