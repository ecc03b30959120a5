//! Remote publish client.
//!
//! [`Transport`] is the seam between request construction and the network.
//! [`PublishClient`] owns the create-or-update rules and turns every failure
//! into a [`crate::error::PublishError`] tagged with its target.

mod http;
mod publish;

use std::future::Future;

use serde_json::Value;

pub use http::ReqwestTransport;
pub use publish::{PasteResult, PictureInfo, PreviousPaste, PublishClient};

pub use crate::payload::{ApiRequest, RequestBody};

/// Raw HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body parsed as JSON, `None` when it is not JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends one request with bearer authorization.
///
/// `Err` means no HTTP response was received at all. Timeouts belong to the
/// implementation; callers never retry.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        bearer: &str,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, String>> + Send;
}

impl<T: Transport> Transport for &T {
    fn send(
        &self,
        bearer: &str,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, String>> + Send {
        (**self).send(bearer, request)
    }
}
