/// Storage over chrome.storage.local: the session store and the check log
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::Cell;

use crate::error::Result;
use crate::models::Session;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";
pub const OUTPUT_KEY: &str = "output";
pub const FROM_CACHE_KEY: &str = "from_cache";
pub const LAST_CHECK_KEY: &str = "last_check";

/// Extension-shared key/value storage
#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;
    async fn set(&self, entries: Map<String, Value>) -> Result<()>;
    async fn remove(&self, keys: &[&str]) -> Result<()>;
}

#[async_trait(?Send)]
impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        (**self).get(keys).await
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        (**self).set(entries).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        (**self).remove(keys).await
    }
}

/// The one authoritative copy of the session. The popup, history page and
/// background all read and write through this; other contexts hear about
/// changes through storage change events (see [`SessionEvent`]).
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        SessionStore { store }
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        let values = self.store.get(&[TOKEN_KEY, USERNAME_KEY]).await?;
        let token = string_value(&values, TOKEN_KEY);
        let username = string_value(&values, USERNAME_KEY);

        Ok(token.map(|token| Session {
            token,
            username: username.unwrap_or_default(),
        }))
    }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self.load().await?.map(|session| session.token))
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let mut entries = Map::new();
        entries.insert(TOKEN_KEY.to_string(), Value::String(session.token.clone()));
        entries.insert(USERNAME_KEY.to_string(), Value::String(session.username.clone()));
        self.store.set(entries).await?;
        log::debug!("Session stored for {}", session.username);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(&[TOKEN_KEY, USERNAME_KEY]).await?;
        log::debug!("Session cleared");
        Ok(())
    }
}

/// Session change observed through `chrome.storage.onChanged`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

impl SessionEvent {
    /// Decode a storage change payload (`{key: {oldValue, newValue}}`).
    /// Returns `None` when the token was not touched.
    pub fn from_changes(changes: &Value) -> Option<SessionEvent> {
        let change = changes.get(TOKEN_KEY)?;
        let signed_in = change
            .get("newValue")
            .and_then(Value::as_str)
            .is_some_and(|token| !token.is_empty());

        Some(if signed_in {
            SessionEvent::SignedIn
        } else {
            SessionEvent::SignedOut
        })
    }
}

/// Outcome of one classification request, as shown in the popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub request_id: u64,
    pub url: String,
    pub output: String,
    pub from_cache: bool,
}

impl CheckRecord {
    pub fn domain(&self) -> Option<String> {
        crate::domain::extract_domain(&self.url)
    }

    pub fn is_error(&self) -> bool {
        self.output.starts_with("Error:")
    }
}

/// Records check outcomes for the popup. Request ids are issued in order; a
/// record older than the newest one already written is dropped, so a slow
/// response cannot overwrite a fresher one.
#[derive(Debug, Default)]
pub struct ResultLog {
    newest: Cell<u64>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the record was stale and not written
    pub async fn record<S: KeyValueStore>(&self, store: &S, record: &CheckRecord) -> Result<bool> {
        if record.request_id < self.newest.get() {
            log::debug!(
                "Dropping stale result #{} for {} (newest is #{})",
                record.request_id,
                record.url,
                self.newest.get()
            );
            return Ok(false);
        }
        self.newest.set(record.request_id);

        let mut entries = Map::new();
        entries.insert(OUTPUT_KEY.to_string(), Value::String(record.output.clone()));
        entries.insert(FROM_CACHE_KEY.to_string(), Value::Bool(record.from_cache));
        entries.insert(LAST_CHECK_KEY.to_string(), serde_json::to_value(record)?);
        store.set(entries).await?;
        Ok(true)
    }

    pub async fn load<S: KeyValueStore>(store: &S) -> Result<Option<CheckRecord>> {
        let mut values = store.get(&[LAST_CHECK_KEY, OUTPUT_KEY, FROM_CACHE_KEY]).await?;

        if let Some(last) = values.remove(LAST_CHECK_KEY).filter(|v| !v.is_null()) {
            return Ok(Some(serde_json::from_value(last)?));
        }

        // Only the bare output/from_cache pair is present
        Ok(string_value(&values, OUTPUT_KEY).map(|output| CheckRecord {
            request_id: 0,
            url: String::new(),
            output,
            from_cache: values.get(FROM_CACHE_KEY).and_then(Value::as_bool).unwrap_or(false),
        }))
    }
}

fn string_value(values: &Map<String, Value>, key: &str) -> Option<String> {
    values
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
