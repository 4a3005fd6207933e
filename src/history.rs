/// History viewer data loading
use crate::api::Backend;
use crate::models::HistoryEntry;
use crate::storage::{KeyValueStore, SessionStore};

pub const EMPTY_HISTORY_TEXT: &str = "No URL history found.";

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    /// No session: send the user back to the popup to sign in
    SignInRequired,
    Entries(Vec<HistoryEntry>),
    Failed(String),
}

impl HistoryView {
    /// Placeholder shown instead of the list, if any
    pub fn placeholder(&self) -> Option<String> {
        match self {
            HistoryView::Entries(entries) if entries.is_empty() => Some(EMPTY_HISTORY_TEXT.to_string()),
            HistoryView::Failed(reason) => Some(format!("Error loading history: {}", reason)),
            _ => None,
        }
    }
}

/// Fetch history for the signed-in user, in the order the backend returns it
pub async fn load_history<S: KeyValueStore, B: Backend>(store: &S, backend: &B) -> HistoryView {
    let token = match SessionStore::new(store).token().await {
        Ok(Some(token)) => token,
        Ok(None) => return HistoryView::SignInRequired,
        Err(err) => return HistoryView::Failed(err.to_string()),
    };

    match backend.url_history(&token).await {
        Ok(entries) => {
            log::debug!("Loaded {} history entries", entries.len());
            HistoryView::Entries(entries)
        }
        Err(err) => {
            log::warn!("Failed to fetch history: {}", err);
            HistoryView::Failed(err.to_string())
        }
    }
}

/// `Status:` badge text for an entry
pub fn status_label(entry: &HistoryEntry) -> String {
    entry.classification.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtensionError;
    use crate::testing::{FakeBackend, MemoryStore};
    use futures::executor::block_on;

    fn entry(domain: &str, classification: &str) -> HistoryEntry {
        HistoryEntry {
            id: None,
            domain: domain.to_string(),
            check_date: "2024-05-01 10:00:00".to_string(),
            classification: classification.to_string(),
            summary: None,
        }
    }

    #[test]
    fn test_requires_session() {
        let store = MemoryStore::default();
        let backend = FakeBackend::default();

        assert_eq!(block_on(load_history(&store, &backend)), HistoryView::SignInRequired);
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_history_placeholder() {
        let store = MemoryStore::with_session("tok", "alice");
        let backend = FakeBackend::default();
        backend.history_result.replace(Some(Ok(vec![])));

        let view = block_on(load_history(&store, &backend));

        assert_eq!(view.placeholder(), Some("No URL history found.".to_string()));
    }

    #[test]
    fn test_error_placeholder_contains_reason() {
        let store = MemoryStore::with_session("tok", "alice");
        let backend = FakeBackend::default();
        backend
            .history_result
            .replace(Some(Err(ExtensionError::Network("Failed to fetch".to_string()))));

        let placeholder = block_on(load_history(&store, &backend)).placeholder().unwrap();

        assert!(placeholder.starts_with("Error loading history:"));
        assert!(placeholder.contains("Failed to fetch"));
    }

    #[test]
    fn test_entries_keep_backend_order() {
        let store = MemoryStore::with_session("tok", "alice");
        let backend = FakeBackend::default();
        let entries = vec![entry("zeta.test", "safe"), entry("alpha.test", "suspicious")];
        backend.history_result.replace(Some(Ok(entries.clone())));

        let view = block_on(load_history(&store, &backend));

        assert_eq!(view, HistoryView::Entries(entries));
        assert_eq!(view.placeholder(), None);
        assert_eq!(*backend.calls.borrow(), vec!["url-history tok".to_string()]);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&entry("a.test", "suspicious")), "SUSPICIOUS");
    }
}
