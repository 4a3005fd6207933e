/// Error types shared by the background, content and popup contexts
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtensionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtensionError {
    /// 401/403 from an authenticated endpoint
    #[error("Authentication failed")]
    Unauthorized,

    #[error("HTTP error! status: {0}")]
    Http(u16),

    /// Backend answered with an `{error}` / `{message}` body
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to warn tab {tab_id}")]
    Delivery { tab_id: i32, reason: String },

    /// A chrome.* call through the JS bridge failed
    #[error("Browser API error: {0}")]
    Bridge(String),
}

impl ExtensionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ExtensionError::Unauthorized)
    }

    /// Text recorded for the popup, e.g. `Error: Authentication failed`
    pub fn status_text(&self) -> String {
        format!("Error: {}", self)
    }
}

impl From<reqwest::Error> for ExtensionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExtensionError::Decode(err.to_string())
        } else {
            ExtensionError::Network(err.to_string())
        }
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        ExtensionError::Storage(err.to_string())
    }
}

/// Failure to hand a message to a tab's content script
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DeliveryError {
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        DeliveryError {
            message: message.into(),
        }
    }

    /// True when nothing is listening in the tab yet (content script not attached)
    pub fn is_no_receiver(&self) -> bool {
        self.message.contains("Receiving end does not exist")
            || self.message.contains("Could not establish connection")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(
            ExtensionError::Unauthorized.status_text(),
            "Error: Authentication failed"
        );
        assert_eq!(ExtensionError::Http(500).status_text(), "Error: HTTP error! status: 500");
        assert_eq!(
            ExtensionError::Delivery { tab_id: 7, reason: "gone".to_string() }.status_text(),
            "Error: Failed to warn tab 7"
        );
    }

    #[test]
    fn test_no_receiver_detection() {
        let chrome_msg = "Could not establish connection. Receiving end does not exist.";
        assert!(DeliveryError::new(chrome_msg).is_no_receiver());
        assert!(DeliveryError::new("Receiving end does not exist.").is_no_receiver());
        assert!(!DeliveryError::new("No tab with id: 12.").is_no_receiver());
        assert!(!DeliveryError::new("The message port closed before a response was received.").is_no_receiver());
    }
}
