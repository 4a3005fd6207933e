/// URL helpers: registrable-domain extraction and scheme checks
use url::Url;

/// Registrable domain of a URL, for display next to a check result.
///
/// Keeps the last two host labels, or three when the TLD is a two-letter
/// country code under `co`/`com` (`bbc.co.uk`, `example.com.au`). Hosts
/// without dots (`localhost`) and IP addresses are returned unchanged.
pub fn extract_domain(url: &str) -> Option<String> {
    let host = host_of(url)?;

    if !host.contains('.') || is_ip_address(&host) {
        return Some(host);
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return Some(host);
    }

    let tld = labels[labels.len() - 1];
    let keep = if labels.len() >= 3 && tld.len() == 2 && matches!(labels[labels.len() - 2], "co" | "com") {
        3
    } else {
        2
    };

    Some(labels[labels.len() - keep..].join("."))
}

/// Only http(s) pages are worth sending to the backend
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn host_of(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Bare hosts ("example.com/path") have no scheme; give them one
    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed).ok()?
    } else {
        Url::parse(&format!("http://{}", trimmed)).ok()?
    };
    parsed
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
        .filter(|h| !h.is_empty())
}

fn is_ip_address(host: &str) -> bool {
    host.parse::<std::net::IpAddr>().is_ok()
}
