//! Audit log row model

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the upload log. Appended, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local name of the uploaded item (file stem)
    pub original_label: String,
    /// URL assigned by the remote service
    pub remote_url: String,
    /// Note the item was embedded in, empty when uploaded standalone
    pub source_document_label: String,
    pub published_at: DateTime<Local>,
    /// Capture time from image metadata, when present
    pub captured_at: Option<NaiveDateTime>,
}
