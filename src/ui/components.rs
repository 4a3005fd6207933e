/// Reusable UI components

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::operations::ScanReport;
use crate::session::{StatusKind, StatusMessage};
use crate::storage::CheckRecord;

#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
    #[prop_or_default]
    pub status: Option<StatusMessage>,
}

/// Transient success/error line under the title
#[function_component(StatusBanner)]
pub fn status_banner(props: &StatusBannerProps) -> Html {
    match &props.status {
        Some(status) => {
            let alert_type = match status.kind {
                StatusKind::Success => AlertType::Success,
                StatusKind::Error => AlertType::Danger,
            };
            html! {
                <div class="message-top-margin">
                    <Alert r#type={alert_type} title={status.text.clone()} inline={true}>
                    </Alert>
                </div>
            }
        }
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct CheckCardProps {
    pub record: CheckRecord,
}

/// Last recorded classification
#[function_component(CheckCard)]
pub fn check_card(props: &CheckCardProps) -> Html {
    let record = &props.record;
    let label_class = if record.is_error() {
        "check-label error".to_string()
    } else {
        format!("check-label {}", record.output.to_lowercase())
    };

    html! {
        <div class="check-card">
            if let Some(domain) = record.domain() {
                <div class="check-domain">{domain}</div>
            }
            <div class={label_class}>{record.output.clone()}</div>
            if record.from_cache {
                <p class="cache-info">{"Last result was retrieved from cache"}</p>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ScanResultProps {
    pub report: ScanReport,
}

#[function_component(ScanResult)]
pub fn scan_result(props: &ScanResultProps) -> Html {
    match &props.report {
        ScanReport::Completed(summary) => html! {
            <div class="message-top-margin">
                <p>{summary.headline()}</p>
                <p class={if summary.suspicious > 0 { "scan-alert" } else { "scan-ok" }}>
                    {summary.verdict()}
                </p>
                if let Some(note) = summary.cache_note() {
                    <p class="cache-info">{note}</p>
                }
            </div>
        },
        ScanReport::Failed(message) => html! {
            <div class="message-top-margin">
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {message.clone()}
                </Alert>
            </div>
        },
    }
}
