/// Tab scan: classify every open tab in one batch

use std::collections::HashSet;

use crate::api::Backend;
use crate::domain::is_web_url;
use crate::error::ExtensionError;
use crate::models::{ProcessTabsResponse, TabInfo, TabPayload};
use crate::storage::{KeyValueStore, SessionStore};

/// Web tabs only, duplicate URLs dropped (first occurrence wins)
pub fn prepare_scan(tabs: &[TabInfo]) -> Vec<TabPayload> {
    let mut seen_urls = HashSet::new();

    tabs.iter()
        .filter(|tab| is_web_url(&tab.url))
        .filter(|tab| seen_urls.insert(tab.url.as_str()))
        .map(|tab| TabPayload {
            title: tab.title.clone(),
            url: tab.url.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub processed: usize,
    pub suspicious: usize,
    pub cached: usize,
}

impl ScanSummary {
    pub fn headline(&self) -> String {
        format!("Processed {} tabs successfully", self.processed)
    }

    pub fn verdict(&self) -> String {
        if self.suspicious > 0 {
            format!("Found {} suspicious domains!", self.suspicious)
        } else {
            "All domains are safe!".to_string()
        }
    }

    pub fn cache_note(&self) -> Option<String> {
        (self.cached > 0).then(|| format!("{} results were retrieved from cache", self.cached))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanReport {
    Completed(ScanSummary),
    Failed(String),
}

fn summarize(submitted: usize, response: ProcessTabsResponse) -> ScanReport {
    if response.status != "success" {
        let reason = response
            .error
            .or(response.message)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "Failed to process tabs".to_string());
        return ScanReport::Failed(format!("Error: {}", reason));
    }

    ScanReport::Completed(ScanSummary {
        processed: submitted,
        suspicious: response.results.iter().filter(|r| r.is_suspicious()).count(),
        cached: response.results.iter().filter(|r| r.from_cache).count(),
    })
}

pub async fn scan_tabs<S: KeyValueStore, B: Backend>(store: &S, backend: &B, tabs: &[TabInfo]) -> ScanReport {
    let sessions = SessionStore::new(store);
    let token = match sessions.token().await {
        Ok(Some(token)) => token,
        Ok(None) => return ScanReport::Failed("Error: Not authenticated. Please login again.".to_string()),
        Err(err) => return ScanReport::Failed(err.status_text()),
    };

    let payload = prepare_scan(tabs);
    let submitted = payload.len();
    log::info!("Scanning {} of {} open tabs", submitted, tabs.len());

    match backend.process_tabs(&token, payload).await {
        Ok(response) => summarize(submitted, response),
        Err(ExtensionError::Unauthorized) => {
            if let Err(err) = sessions.clear().await {
                log::error!("Failed to clear session: {}", err);
            }
            ScanReport::Failed(ExtensionError::Unauthorized.status_text())
        }
        Err(ExtensionError::Network(reason)) => {
            log::warn!("Tab scan failed: {}", reason);
            ScanReport::Failed("Error collecting tab URLs".to_string())
        }
        Err(err) => ScanReport::Failed(err.status_text()),
    }
}
