/// Classifier client: submits a URL with the stored token
use crate::api::Backend;
use crate::error::Result;
use crate::models::ClassificationResult;
use crate::storage::{KeyValueStore, SessionStore};

pub struct Classifier<'a, S, B> {
    sessions: SessionStore<&'a S>,
    backend: &'a B,
}

impl<'a, S: KeyValueStore, B: Backend> Classifier<'a, S, B> {
    pub fn new(store: &'a S, backend: &'a B) -> Self {
        Classifier {
            sessions: SessionStore::new(store),
            backend,
        }
    }

    /// `Ok(None)` when nobody is signed in: no request is made and nothing is
    /// reported. A 401/403 clears the stored session before the error is
    /// returned. No retries at this layer.
    pub async fn classify(&self, url: &str) -> Result<Option<ClassificationResult>> {
        let Some(token) = self.sessions.token().await? else {
            log::debug!("No authentication token found; skipping {}", url);
            return Ok(None);
        };

        match self.backend.process_url(&token, url).await {
            Ok(result) => {
                log::info!(
                    "Classification for {}: {} (from cache: {})",
                    url,
                    result.label,
                    result.from_cache
                );
                Ok(Some(result))
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.sessions.clear().await?;
                    log::warn!("Token cleared due to authentication failure");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtensionError;
    use crate::storage::TOKEN_KEY;
    use crate::testing::{FakeBackend, MemoryStore};
    use futures::executor::block_on;

    #[test]
    fn test_no_token_makes_no_request() {
        let store = MemoryStore::default();
        let backend = FakeBackend::classifying("suspicious", None);

        let result = block_on(Classifier::new(&store, &backend).classify("https://a.test")).unwrap();

        assert_eq!(result, None);
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn test_sends_token_and_url() {
        let store = MemoryStore::with_session("tok-9", "alice");
        let backend = FakeBackend::classifying("safe", None);

        let result = block_on(Classifier::new(&store, &backend).classify("https://a.test/x"))
            .unwrap()
            .unwrap();

        assert_eq!(result.label, "safe");
        assert_eq!(*backend.calls.borrow(), vec!["process-url tok-9 https://a.test/x".to_string()]);
    }

    #[test]
    fn test_unauthorized_clears_token() {
        let store = MemoryStore::with_session("expired", "alice");
        let backend = FakeBackend::failing(ExtensionError::Unauthorized);

        let result = block_on(Classifier::new(&store, &backend).classify("https://a.test"));

        assert_eq!(result, Err(ExtensionError::Unauthorized));
        assert!(!store.contains(TOKEN_KEY));
    }

    #[test]
    fn test_other_failures_keep_token_and_do_not_retry() {
        let store = MemoryStore::with_session("tok", "alice");
        let backend = FakeBackend::failing(ExtensionError::Http(500));

        let result = block_on(Classifier::new(&store, &backend).classify("https://a.test"));

        assert_eq!(result, Err(ExtensionError::Http(500)));
        assert!(store.contains(TOKEN_KEY));
        assert_eq!(backend.call_count("process-url"), 1);
    }
}
