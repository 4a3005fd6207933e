/// Navigation watcher, background half: decides which tab updates get
/// classified and waits (briefly) for the document to finish loading
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::retry::Timer;

/// Runs `document.readyState === "complete"` inside a tab
#[async_trait(?Send)]
pub trait ReadyStateProbe {
    async fn is_document_complete(&self, tab_id: i32) -> Result<bool>;
}

/// The parts of a `chrome.tabs.onUpdated` notification we use. `url` comes
/// from the tab, not the change info, since the latter may not be final.
#[derive(Debug, Clone, PartialEq)]
pub struct TabUpdate {
    pub tab_id: i32,
    pub status: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeInfo {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TabSnapshot {
    #[serde(default)]
    pub url: Option<String>,
}

impl TabUpdate {
    pub fn new(tab_id: i32, change: ChangeInfo, tab: TabSnapshot) -> Self {
        TabUpdate {
            tab_id,
            status: change.status,
            url: tab.url,
        }
    }

    /// The URL to classify, if this update marks a finished load
    pub fn completed_url(&self) -> Option<&str> {
        if self.status.as_deref() != Some("complete") {
            return None;
        }
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The page reported `readyState === "complete"`
    Confirmed,
    /// Not confirmed within the retry window; proceeding anyway
    Assumed,
}

/// One immediate probe, then one more after `retry_delay`. Never blocks past
/// that: an unconfirmed or unprobeable page is treated as ready.
pub async fn await_document_ready<P, T>(probe: &P, timer: &T, tab_id: i32, retry_delay: Duration) -> Readiness
where
    P: ReadyStateProbe + ?Sized,
    T: Timer + ?Sized,
{
    match probe.is_document_complete(tab_id).await {
        Ok(true) => return Readiness::Confirmed,
        Ok(false) => log::debug!("Document in tab {} not fully loaded yet, waiting...", tab_id),
        Err(err) => {
            log::warn!("Error checking document ready state in tab {}: {}", tab_id, err);
            return Readiness::Assumed;
        }
    }

    timer.sleep(retry_delay).await;

    match probe.is_document_complete(tab_id).await {
        Ok(true) => Readiness::Confirmed,
        Ok(false) => {
            log::debug!("Document in tab {} still not fully loaded, proceeding anyway", tab_id);
            Readiness::Assumed
        }
        Err(err) => {
            log::warn!("Error checking document ready state in tab {}: {}", tab_id, err);
            Readiness::Assumed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedProbe, RecordingTimer};
    use futures::executor::block_on;

    fn update(status: Option<&str>, url: Option<&str>) -> TabUpdate {
        TabUpdate {
            tab_id: 3,
            status: status.map(str::to_string),
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_completed_url_filter() {
        assert_eq!(update(Some("complete"), Some("https://a.test")).completed_url(), Some("https://a.test"));
        assert_eq!(update(Some("loading"), Some("https://a.test")).completed_url(), None);
        assert_eq!(update(None, Some("https://a.test")).completed_url(), None);
        assert_eq!(update(Some("complete"), None).completed_url(), None);
        assert_eq!(update(Some("complete"), Some("")).completed_url(), None);
    }

    #[test]
    fn test_tab_update_from_wire() {
        let change: ChangeInfo = serde_json::from_str(r#"{"status": "complete"}"#).unwrap();
        let tab: TabSnapshot = serde_json::from_str(r#"{"id": 3, "url": "https://a.test", "title": "A"}"#).unwrap();
        assert_eq!(TabUpdate::new(3, change, tab), update(Some("complete"), Some("https://a.test")));
    }

    #[test]
    fn test_ready_on_first_probe() {
        let probe = FixedProbe::new(&[Some(true)]);
        let timer = RecordingTimer::default();

        let readiness = block_on(await_document_ready(&probe, &timer, 3, Duration::from_secs(1)));

        assert_eq!(readiness, Readiness::Confirmed);
        assert_eq!(probe.probes.get(), 1);
        assert!(timer.delays().is_empty());
    }

    #[test]
    fn test_ready_on_second_probe() {
        let probe = FixedProbe::new(&[Some(false), Some(true)]);
        let timer = RecordingTimer::default();

        let readiness = block_on(await_document_ready(&probe, &timer, 3, Duration::from_secs(1)));

        assert_eq!(readiness, Readiness::Confirmed);
        assert_eq!(probe.probes.get(), 2);
        assert_eq!(timer.delays(), vec![Duration::from_secs(1)]);
    }

    #[test]
    fn test_never_ready_proceeds_after_one_retry() {
        let probe = FixedProbe::new(&[Some(false), Some(false)]);
        let timer = RecordingTimer::default();

        let readiness = block_on(await_document_ready(&probe, &timer, 3, Duration::from_secs(1)));

        assert_eq!(readiness, Readiness::Assumed);
        assert_eq!(probe.probes.get(), 2);
    }

    #[test]
    fn test_probe_error_proceeds_immediately() {
        let probe = FixedProbe::new(&[None]);
        let timer = RecordingTimer::default();

        let readiness = block_on(await_document_ready(&probe, &timer, 3, Duration::from_secs(1)));

        assert_eq!(readiness, Readiness::Assumed);
        assert_eq!(probe.probes.get(), 1);
        assert!(timer.delays().is_empty());
    }
}
