//! reqwest-backed transport.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use super::{ApiRequest, ApiResponse, RequestBody, Transport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP transport used outside of tests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lolpub/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| format!("Failed to construct HTTP client: {error}"))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, bearer: &str, request: &ApiRequest) -> Result<ApiResponse, String> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .bearer_auth(bearer)
            .header(ACCEPT, "application/json");
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Text(text) => builder
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text.clone()),
        };

        let response = builder
            .send()
            .await
            .map_err(|error| format!("{} request failed: {error}", request.target))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| format!("Failed to read {} response: {error}", request.target))?;

        debug!(status, "Received response");
        Ok(ApiResponse { status, body })
    }
}
