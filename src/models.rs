/// Data structures for URL Guard: sessions, classification results, backend
/// payloads and the messages exchanged with content scripts
use serde::{Deserialize, Serialize};

pub const SUSPICIOUS_LABEL: &str = "suspicious";

pub const DEFAULT_WARNING_SUMMARY: &str =
    "This URL contains suspicious patterns or has been reported as potentially harmful.";

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Backend verdict for a single URL
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub summary: Option<String>,
    pub from_cache: bool,
}

impl ClassificationResult {
    pub fn is_suspicious(&self) -> bool {
        self.label.eq_ignore_ascii_case(SUSPICIOUS_LABEL)
    }

    /// Text shown in the warning overlay
    pub fn warning_summary(&self) -> &str {
        self.summary.as_deref().unwrap_or(DEFAULT_WARNING_SUMMARY)
    }
}

/// One row of `/url-history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub domain: String,
    pub check_date: String,
    pub classification: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl HistoryEntry {
    pub fn summary(&self) -> Option<&str> {
        non_empty(self.summary.as_deref())
    }
}

/// Information about a browser tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i32,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String) -> TabInfo {
        TabInfo { id, url, title }
    }
}

/// A tab as submitted to `/process-tabs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabPayload {
    pub title: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Backend wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Error body returned by the backend on failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn reason(&self) -> Option<&str> {
        non_empty(self.error.as_deref()).or_else(|| non_empty(self.message.as_deref()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessUrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessUrlResponse {
    pub output: String,
    #[serde(default)]
    pub from_cache: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
}

impl From<ProcessUrlResponse> for ClassificationResult {
    fn from(response: ProcessUrlResponse) -> Self {
        let summary = non_empty(response.summary.as_deref()).map(str::to_string);
        ClassificationResult {
            label: response.output,
            summary,
            from_cache: response.from_cache,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessTabsRequest {
    pub tabs: Vec<TabPayload>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    pub classification: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub from_cache: bool,
}

impl TabResult {
    pub fn is_suspicious(&self) -> bool {
        self.classification.eq_ignore_ascii_case(SUSPICIOUS_LABEL)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessTabsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Vec<TabResult>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

// ---------------------------------------------------------------------------
// Extension messages
// ---------------------------------------------------------------------------

/// Messages between the background worker and content scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ExtensionMessage {
    /// In-page navigation detected by the content script
    #[serde(rename = "classifyURL")]
    ClassifyUrl { url: String },

    /// Background asks the content script to show the warning overlay
    #[serde(rename = "showSuspiciousModal")]
    ShowSuspiciousModal { summary: String },
}

/// Content script reply to `showSuspiciousModal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalAck {
    pub status: String,
}

impl ModalAck {
    pub fn shown() -> ModalAck {
        ModalAck {
            status: "Modal shown".to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
