/// Popup UI for URL Guard: sign-in, last check, tab scan, history link

use patternfly_yew::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api::HttpBackend;
use crate::chrome::{self, BrowserTimer, ChromeStorage};
use crate::config::ExtensionConfig;
use crate::models::Credentials;
use crate::operations::{ScanReport, scan_tabs};
use crate::retry::Timer;
use crate::session::{AuthService, AuthState, StatusMessage};
use crate::storage::{CheckRecord, LAST_CHECK_KEY, ResultLog, SessionEvent, SessionStore};
use crate::ui::components::{CheckCard, ScanResult, StatusBanner};

#[derive(Clone, Copy, PartialEq)]
enum AuthMode {
    Login,
    Register,
}

#[derive(Clone, PartialEq)]
enum ScanState {
    Idle,
    Running,
    Done(ScanReport),
}

/// Re-read the stored session into `auth`
fn refresh_session(auth: UseStateHandle<Option<AuthState>>) {
    spawn_local(async move {
        match SessionStore::new(ChromeStorage).load().await {
            Ok(session) => auth.set(Some(AuthState::from_session(session.as_ref()))),
            Err(e) => {
                log::error!("Failed to load session: {}", e);
                auth.set(Some(AuthState::Unauthenticated));
            }
        }
    });
}

#[function_component(App)]
pub fn app() -> Html {
    let config = ExtensionConfig::from_build_env();
    let auth = use_state(|| None::<AuthState>);
    let mode = use_state(|| AuthMode::Login);
    let register_epoch = use_state(|| 0u32);
    let busy = use_state(|| false);
    let status = use_state(|| None::<StatusMessage>);
    let status_generation: Rc<RefCell<u64>> = use_mut_ref(|| 0);
    let last_check = use_state(|| None::<CheckRecord>);
    let scan = use_state(|| ScanState::Idle);

    // Load session and last result on mount, then follow storage changes
    {
        let auth = auth.clone();
        let last_check = last_check.clone();

        use_effect_with((), move |_| {
            refresh_session(auth.clone());

            {
                let last_check = last_check.clone();
                spawn_local(async move {
                    match ResultLog::load(&ChromeStorage).await {
                        Ok(record) => last_check.set(record),
                        Err(e) => log::warn!("Failed to load last result: {}", e),
                    }
                });
            }

            chrome::watch_storage(move |changes| {
                match SessionEvent::from_changes(&changes) {
                    Some(SessionEvent::SignedOut) => auth.set(Some(AuthState::Unauthenticated)),
                    Some(SessionEvent::SignedIn) => refresh_session(auth.clone()),
                    None => {}
                }

                if let Some(record) = changes
                    .get(LAST_CHECK_KEY)
                    .and_then(|change| change.get("newValue"))
                    .and_then(|value| serde_json::from_value::<CheckRecord>(value.clone()).ok())
                {
                    last_check.set(Some(record));
                }
            });
            || ()
        });
    }

    // Show a status line; only the newest message's timer clears it
    let flash = {
        let status = status.clone();
        let status_generation = status_generation.clone();
        let delay = config.status_clear_delay();

        Callback::from(move |message: StatusMessage| {
            let generation = {
                let mut current = status_generation.borrow_mut();
                *current += 1;
                *current
            };
            status.set(Some(message));

            let status = status.clone();
            let status_generation = status_generation.clone();
            spawn_local(async move {
                BrowserTimer.sleep(delay).await;
                if *status_generation.borrow() == generation {
                    status.set(None);
                }
            });
        })
    };

    let on_login = {
        let auth = auth.clone();
        let busy = busy.clone();
        let flash = flash.clone();
        let config = config.clone();

        Callback::from(move |credentials: Credentials| {
            let auth = auth.clone();
            let busy = busy.clone();
            let flash = flash.clone();
            let backend = HttpBackend::new(config.clone());

            busy.set(true);
            spawn_local(async move {
                match AuthService::new(&ChromeStorage, &backend).login(&credentials).await {
                    Ok(session) => {
                        auth.set(Some(AuthState::from_session(Some(&session))));
                        flash.emit(StatusMessage::success("Login successful!"));
                    }
                    Err(message) => flash.emit(message),
                }
                busy.set(false);
            });
        })
    };

    let on_register = {
        let mode = mode.clone();
        let register_epoch = register_epoch.clone();
        let busy = busy.clone();
        let flash = flash.clone();
        let config = config.clone();

        Callback::from(move |credentials: Credentials| {
            let mode = mode.clone();
            let register_epoch = register_epoch.clone();
            let busy = busy.clone();
            let flash = flash.clone();
            let backend = HttpBackend::new(config.clone());

            busy.set(true);
            spawn_local(async move {
                match AuthService::new(&ChromeStorage, &backend).register(&credentials).await {
                    Ok(message) => {
                        // Fresh (empty) register form, back on the login form
                        register_epoch.set(*register_epoch + 1);
                        mode.set(AuthMode::Login);
                        flash.emit(message);
                    }
                    Err(message) => flash.emit(message),
                }
                busy.set(false);
            });
        })
    };

    let on_logout = {
        let auth = auth.clone();
        let scan = scan.clone();
        let flash = flash.clone();
        let config = config.clone();

        Callback::from(move |_| {
            let auth = auth.clone();
            let scan = scan.clone();
            let flash = flash.clone();
            let backend = HttpBackend::new(config.clone());

            spawn_local(async move {
                match AuthService::new(&ChromeStorage, &backend).logout().await {
                    Ok(message) => {
                        auth.set(Some(AuthState::Unauthenticated));
                        scan.set(ScanState::Idle);
                        flash.emit(message);
                    }
                    Err(message) => flash.emit(message),
                }
            });
        })
    };

    let on_scan = {
        let scan = scan.clone();
        let config = config.clone();

        Callback::from(move |_| {
            let scan = scan.clone();
            let backend = HttpBackend::new(config.clone());

            scan.set(ScanState::Running);
            spawn_local(async move {
                let report = match chrome::query_all_tabs().await {
                    Ok(tabs) => scan_tabs(&ChromeStorage, &backend, &tabs).await,
                    Err(e) => {
                        log::error!("Failed to query tabs: {}", e);
                        ScanReport::Failed("Error collecting tab URLs".to_string())
                    }
                };
                scan.set(ScanState::Done(report));
            });
        })
    };

    let on_history = Callback::from(move |_| {
        spawn_local(async move {
            if let Err(e) = chrome::open_extension_page("history.html").await {
                log::error!("Failed to open history: {}", e);
            }
        });
    });

    let on_mode_click = {
        let mode = mode.clone();
        move |target: AuthMode| {
            let mode = mode.clone();
            Callback::from(move |_| mode.set(target))
        }
    };

    let tab_class = |target: AuthMode| {
        if *mode == target { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"URL Guard"}</h1>

            <StatusBanner status={(*status).clone()} />

            {match &*auth {
                None => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                Some(AuthState::Unauthenticated) => html! {
                    <div>
                        <div class="pf-v5-c-tabs tabs-nav">
                            <ul class="pf-v5-c-tabs__list">
                                <li class={tab_class(AuthMode::Login)}>
                                    <button class="pf-v5-c-tabs__link" onclick={on_mode_click(AuthMode::Login)}>
                                        <span class="pf-v5-c-tabs__item-text">{"Login"}</span>
                                    </button>
                                </li>
                                <li class={tab_class(AuthMode::Register)}>
                                    <button class="pf-v5-c-tabs__link" onclick={on_mode_click(AuthMode::Register)}>
                                        <span class="pf-v5-c-tabs__item-text">{"Register"}</span>
                                    </button>
                                </li>
                            </ul>
                        </div>

                        {match *mode {
                            AuthMode::Login => html! {
                                <CredentialsForm
                                    key="login"
                                    submit_label="Login"
                                    busy={*busy}
                                    on_submit={on_login}
                                />
                            },
                            AuthMode::Register => html! {
                                <CredentialsForm
                                    key={format!("register-{}", *register_epoch)}
                                    submit_label="Register"
                                    busy={*busy}
                                    on_submit={on_register}
                                />
                            },
                        }}
                    </div>
                },
                Some(AuthState::Authenticated { username }) => html! {
                    <div class="flex-column-gap">
                        <p>{"Signed in as "}<strong>{username.clone()}</strong></p>

                        if let Some(record) = (*last_check).clone() {
                            <CheckCard record={record} />
                        }

                        <Button
                            onclick={on_scan}
                            disabled={*scan == ScanState::Running}
                            variant={ButtonVariant::Secondary}
                            block={true}
                        >
                            {"Scan Open Tabs"}
                        </Button>

                        {match &*scan {
                            ScanState::Idle => html! {},
                            ScanState::Running => html! {
                                <div class="loading-text-center">
                                    <Spinner />
                                    <p class="loading-text">{"Checking open tabs..."}</p>
                                </div>
                            },
                            ScanState::Done(report) => html! { <ScanResult report={report.clone()} /> },
                        }}

                        <Button onclick={on_history} variant={ButtonVariant::Secondary} block={true}>
                            {"View History"}
                        </Button>
                        <Button onclick={on_logout} variant={ButtonVariant::Danger} block={true}>
                            {"Logout"}
                        </Button>
                    </div>
                },
            }}

            <p class="footer-popup">
                {"URL Guard v0.1.0"}
            </p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CredentialsFormProps {
    submit_label: AttrValue,
    busy: bool,
    on_submit: Callback<Credentials>,
}

#[function_component(CredentialsForm)]
fn credentials_form(props: &CredentialsFormProps) -> Html {
    let username = use_state(String::new);
    let password = use_state(String::new);

    let on_username = {
        let username = username.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                username.set(input.value());
            }
        })
    };

    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };

    let on_click = {
        let username = username.clone();
        let password = password.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |_| {
            on_submit.emit(Credentials::new(&username, &password));
        })
    };

    html! {
        <div class="flex-column-gap">
            <input
                type="text"
                class="auth-input"
                placeholder="Username"
                value={(*username).clone()}
                oninput={on_username}
            />
            <input
                type="password"
                class="auth-input"
                placeholder="Password"
                value={(*password).clone()}
                oninput={on_password}
            />
            <Button onclick={on_click} disabled={props.busy} variant={ButtonVariant::Primary} block={true}>
                {props.submit_label.clone()}
            </Button>
        </div>
    }
}
