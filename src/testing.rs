/// In-memory stand-ins for browser APIs and the backend, shared by unit tests
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::api::Backend;
use crate::error::{DeliveryError, ExtensionError, Result};
use crate::navigation::ReadyStateProbe;
use crate::notifier::TabMessenger;
use crate::models::{
    ClassificationResult, Credentials, ExtensionMessage, HistoryEntry, ModalAck,
    ProcessTabsResponse, Session, TabPayload,
};
use crate::retry::Timer;
use crate::storage::KeyValueStore;

#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn with_entries(entries: &[(&str, Value)]) -> Self {
        let store = MemoryStore::default();
        for (key, value) in entries {
            store.values.borrow_mut().insert(key.to_string(), value.clone());
        }
        store
    }

    pub fn with_session(token: &str, username: &str) -> Self {
        Self::with_entries(&[
            ("token", Value::String(token.to_string())),
            ("username", Value::String(username.to_string())),
        ])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.values.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        self.values.borrow_mut().extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.values.borrow_mut();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

/// Records every requested delay instead of waiting
#[derive(Default)]
pub struct RecordingTimer {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Timer for RecordingTimer {
    async fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

/// Backend with canned answers and a call log
#[derive(Default)]
pub struct FakeBackend {
    pub classification: RefCell<Option<Result<ClassificationResult>>>,
    pub login_result: RefCell<Option<Result<Session>>>,
    pub register_result: RefCell<Option<Result<()>>>,
    pub tabs_result: RefCell<Option<Result<ProcessTabsResponse>>>,
    pub history_result: RefCell<Option<Result<Vec<HistoryEntry>>>>,
    pub calls: RefCell<Vec<String>>,
    pub submitted_tabs: RefCell<Vec<TabPayload>>,
}

impl FakeBackend {
    pub fn classifying(label: &str, summary: Option<&str>) -> Self {
        let backend = FakeBackend::default();
        backend.classification.replace(Some(Ok(ClassificationResult {
            label: label.to_string(),
            summary: summary.map(str::to_string),
            from_cache: false,
        })));
        backend
    }

    pub fn failing(error: ExtensionError) -> Self {
        let backend = FakeBackend::default();
        backend.classification.replace(Some(Err(error)));
        backend
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(endpoint)).count()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn canned<T: Clone>(slot: &RefCell<Option<Result<T>>>) -> Result<T> {
    slot.borrow()
        .clone()
        .unwrap_or_else(|| Err(ExtensionError::Network("no canned response".to_string())))
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        self.log(format!("login {}", credentials.username));
        canned(&self.login_result)
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.log(format!("register {}", credentials.username));
        canned(&self.register_result)
    }

    async fn process_url(&self, token: &str, url: &str) -> Result<ClassificationResult> {
        self.log(format!("process-url {} {}", token, url));
        canned(&self.classification)
    }

    async fn process_tabs(&self, token: &str, tabs: Vec<TabPayload>) -> Result<ProcessTabsResponse> {
        self.log(format!("process-tabs {} {}", token, tabs.len()));
        self.submitted_tabs.replace(tabs);
        canned(&self.tabs_result)
    }

    async fn url_history(&self, token: &str) -> Result<Vec<HistoryEntry>> {
        self.log(format!("url-history {}", token));
        canned(&self.history_result)
    }
}

/// Tab messenger that replays a script of failures before succeeding
#[derive(Default)]
pub struct ScriptedMessenger {
    failures: RefCell<VecDeque<String>>,
    pub sent: RefCell<Vec<(i32, ExtensionMessage)>>,
}

impl ScriptedMessenger {
    pub fn failing_with(failures: &[&str]) -> Self {
        ScriptedMessenger {
            failures: RefCell::new(failures.iter().map(|f| f.to_string()).collect()),
            sent: RefCell::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.sent.borrow().len()
    }
}

#[async_trait(?Send)]
impl TabMessenger for ScriptedMessenger {
    async fn send_to_tab(
        &self,
        tab_id: i32,
        message: &ExtensionMessage,
    ) -> std::result::Result<ModalAck, DeliveryError> {
        self.sent.borrow_mut().push((tab_id, message.clone()));
        match self.failures.borrow_mut().pop_front() {
            Some(failure) => Err(DeliveryError::new(failure)),
            None => Ok(ModalAck::shown()),
        }
    }
}

/// Ready-state probe answering from a fixed script; `None` entries are errors
pub struct FixedProbe {
    answers: RefCell<VecDeque<Option<bool>>>,
    pub probes: Cell<usize>,
}

impl FixedProbe {
    pub fn new(answers: &[Option<bool>]) -> Self {
        FixedProbe {
            answers: RefCell::new(answers.iter().copied().collect()),
            probes: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl ReadyStateProbe for FixedProbe {
    async fn is_document_complete(&self, _tab_id: i32) -> Result<bool> {
        self.probes.set(self.probes.get() + 1);
        match self.answers.borrow_mut().pop_front() {
            Some(Some(ready)) => Ok(ready),
            Some(None) => Err(ExtensionError::Bridge("Cannot access a chrome:// URL".to_string())),
            None => Ok(false),
        }
    }
}
