/// Background worker: navigation events → classifier → notifier → check log
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

use crate::api::{Backend, HttpBackend};
use crate::chrome::{self, BrowserTimer, ChromeStorage, ChromeTabs};
use crate::classifier::Classifier;
use crate::config::ExtensionConfig;
use crate::error::ExtensionError;
use crate::models::{ClassificationResult, ExtensionMessage, ModalAck};
use crate::navigation::{ReadyStateProbe, TabUpdate, await_document_ready};
use crate::notifier::{Notifier, TabMessenger};
use crate::retry::Timer;
use crate::storage::{CheckRecord, KeyValueStore, ResultLog};

/// What happened to one classification request
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Nobody signed in; nothing was sent
    Skipped,
    Classified(ClassificationResult),
    Warned(ClassificationResult, ModalAck),
    WarningFailed(ClassificationResult, ExtensionError),
    Failed(ExtensionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub request_id: u64,
    pub tab_id: i32,
    pub url: String,
    pub outcome: CheckOutcome,
}

impl ClassificationReport {
    /// The popup's view of this report; `None` for skipped checks
    pub fn to_record(&self) -> Option<CheckRecord> {
        let (output, from_cache) = match &self.outcome {
            CheckOutcome::Skipped => return None,
            CheckOutcome::Classified(result) | CheckOutcome::Warned(result, _) => {
                (result.label.clone(), result.from_cache)
            }
            CheckOutcome::WarningFailed(result, err) => (err.status_text(), result.from_cache),
            CheckOutcome::Failed(err) => (err.status_text(), false),
        };

        Some(CheckRecord {
            request_id: self.request_id,
            url: self.url.clone(),
            output,
            from_cache,
        })
    }
}

pub struct Background<S, B, M, P, T> {
    config: ExtensionConfig,
    store: S,
    backend: B,
    messenger: M,
    probe: P,
    timer: T,
    next_request: Cell<u64>,
    results: ResultLog,
}

impl<S, B, M, P, T> Background<S, B, M, P, T>
where
    S: KeyValueStore,
    B: Backend,
    M: TabMessenger,
    P: ReadyStateProbe,
    T: Timer,
{
    pub fn new(config: ExtensionConfig, store: S, backend: B, messenger: M, probe: P, timer: T) -> Self {
        Background {
            config,
            store,
            backend,
            messenger,
            probe,
            timer,
            next_request: Cell::new(1),
            results: ResultLog::new(),
        }
    }

    /// `chrome.tabs.onUpdated`: exactly one check per finished load
    pub async fn handle_tab_updated(&self, update: TabUpdate) -> Option<ClassificationReport> {
        let url = update.completed_url()?.to_string();
        log::debug!("Tab {} complete, URL: {}", update.tab_id, url);

        await_document_ready(&self.probe, &self.timer, update.tab_id, self.config.ready_retry_delay()).await;
        Some(self.check_url(update.tab_id, &url).await)
    }

    /// `chrome.runtime.onMessage` from a content script
    pub async fn handle_message(
        &self,
        message: ExtensionMessage,
        sender_tab: Option<i32>,
    ) -> Option<ClassificationReport> {
        match message {
            ExtensionMessage::ClassifyUrl { url } => {
                let Some(tab_id) = sender_tab else {
                    log::warn!("classifyURL for {} arrived without a sender tab", url);
                    return None;
                };
                log::debug!("In-page navigation in tab {}: {}", tab_id, url);
                Some(self.check_url(tab_id, &url).await)
            }
            ExtensionMessage::ShowSuspiciousModal { .. } => None,
        }
    }

    /// Classify `url`, warn `tab_id` if it is suspicious, and log the outcome
    pub async fn check_url(&self, tab_id: i32, url: &str) -> ClassificationReport {
        let request_id = self.next_request.get();
        self.next_request.set(request_id + 1);

        let classifier = Classifier::new(&self.store, &self.backend);
        let outcome = match classifier.classify(url).await {
            Ok(None) => CheckOutcome::Skipped,
            Ok(Some(result)) if result.is_suspicious() => {
                let notifier = Notifier::new(&self.messenger, &self.timer, self.config.notify_policy());
                match notifier.warn(tab_id, &result).await {
                    Ok(ack) => CheckOutcome::Warned(result, ack),
                    Err(err) => CheckOutcome::WarningFailed(result, err),
                }
            }
            Ok(Some(result)) => CheckOutcome::Classified(result),
            Err(err) => {
                log::error!("Error during fetch or processing of {}: {}", url, err);
                CheckOutcome::Failed(err)
            }
        };

        let report = ClassificationReport {
            request_id,
            tab_id,
            url: url.to_string(),
            outcome,
        };

        if let Some(record) = report.to_record() {
            if let Err(err) = self.results.record(&self.store, &record).await {
                log::error!("Failed to record result for {}: {}", url, err);
            }
        }

        report
    }
}

pub type ChromeBackground = Background<ChromeStorage, HttpBackend, ChromeTabs, ChromeTabs, BrowserTimer>;

/// Attach the background handlers. The chrome listeners themselves are added
/// by `background.js` in the worker's first turn; events that arrive before
/// the wasm module loads are queued there and replayed here.
pub fn install(config: ExtensionConfig) {
    let backend = HttpBackend::new(config.clone());
    let background: Rc<ChromeBackground> = Rc::new(Background::new(
        config,
        ChromeStorage,
        backend,
        ChromeTabs,
        ChromeTabs,
        BrowserTimer,
    ));

    {
        let background = background.clone();
        chrome::listen_tab_updates(move |update| {
            let background = background.clone();
            spawn_local(async move {
                background.handle_tab_updated(update).await;
            });
        });
    }

    chrome::listen_runtime_messages(move |message, sender_tab| {
        let background = background.clone();
        spawn_local(async move {
            background.handle_message(message, sender_tab).await;
        });
        None
    });

    log::info!("URL Guard background worker ready");
}
