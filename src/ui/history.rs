/// URL history page

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::HttpBackend;
use crate::chrome::ChromeStorage;
use crate::config::ExtensionConfig;
use crate::history::{HistoryView, load_history, status_label};
use crate::models::HistoryEntry;

#[function_component(HistoryViewer)]
pub fn history_viewer() -> Html {
    let view = use_state(|| None::<HistoryView>);

    // Load history on mount
    {
        let view = view.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let backend = HttpBackend::new(ExtensionConfig::from_build_env());
                let loaded = load_history(&ChromeStorage, &backend).await;

                if loaded == HistoryView::SignInRequired {
                    if let Some(window) = web_sys::window() {
                        if let Err(e) = window.location().set_href("popup.html") {
                            log::error!("Failed to redirect to popup: {:?}", e);
                        }
                    }
                }
                view.set(Some(loaded));
            });
            || ()
        });
    }

    let on_back = Callback::from(|_| {
        if let Some(window) = web_sys::window() {
            let _ = window.close();
        }
    });

    html! {
        <div class="padding-20">
            <div class="history-header">
                <h1>{"URL History"}</h1>
                <Button onclick={on_back} variant={ButtonVariant::Secondary}>
                    {"Back"}
                </Button>
            </div>

            {match &*view {
                None | Some(HistoryView::SignInRequired) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                Some(loaded) => match loaded.placeholder() {
                    Some(text) => html! { <div class="empty-history">{text}</div> },
                    None => html! {
                        <div class="history-list">
                            {for history_entries(loaded).iter().map(render_entry)}
                        </div>
                    },
                },
            }}
        </div>
    }
}

fn history_entries(view: &HistoryView) -> &[HistoryEntry] {
    match view {
        HistoryView::Entries(entries) => entries,
        _ => &[],
    }
}

fn render_entry(entry: &HistoryEntry) -> Html {
    let label = status_label(entry);
    let label_class = format!("classification {}", entry.classification.to_lowercase());

    html! {
        <div class="history-item">
            <div class="history-domain">{entry.domain.clone()}</div>
            <div class="history-date">{entry.check_date.clone()}</div>
            <div class="history-status">
                {"Status: "}<span class={label_class}>{label}</span>
            </div>
            if let Some(summary) = entry.summary() {
                <div class="history-summary">{format!("Why: {}", summary)}</div>
            }
        </div>
    }
}
