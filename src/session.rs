/// Login, registration and logout against the backend
use crate::api::Backend;
use crate::error::ExtensionError;
use crate::models::{Credentials, Session};
use crate::storage::{KeyValueStore, SessionStore};

/// Which screen the popup shows
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated { username: String },
}

impl AuthState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => AuthState::Authenticated {
                username: session.username.clone(),
            },
            None => AuthState::Unauthenticated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient popup message; cleared after the configured delay
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

pub struct AuthService<'a, S, B> {
    sessions: SessionStore<&'a S>,
    backend: &'a B,
}

impl<'a, S: KeyValueStore, B: Backend> AuthService<'a, S, B> {
    pub fn new(store: &'a S, backend: &'a B) -> Self {
        AuthService {
            sessions: SessionStore::new(store),
            backend,
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> std::result::Result<Session, StatusMessage> {
        require_complete(credentials)?;

        let session = self
            .backend
            .login(credentials)
            .await
            .map_err(|err| failure_message(err, "Login failed"))?;

        self.sessions.save(&session).await.map_err(|err| {
            log::error!("Failed to store session: {}", err);
            StatusMessage::error("Login failed")
        })?;

        log::info!("Logged in as {}", session.username);
        Ok(session)
    }

    pub async fn register(&self, credentials: &Credentials) -> std::result::Result<StatusMessage, StatusMessage> {
        require_complete(credentials)?;

        self.backend
            .register(credentials)
            .await
            .map_err(|err| failure_message(err, "Registration failed"))?;

        log::info!("Registered {}", credentials.username);
        Ok(StatusMessage::success("Registration successful! Please login."))
    }

    /// Clears the one stored session; the background stops classifying too
    pub async fn logout(&self) -> std::result::Result<StatusMessage, StatusMessage> {
        self.sessions.clear().await.map_err(|err| {
            log::error!("Failed to clear session: {}", err);
            StatusMessage::error("Logout failed")
        })?;
        Ok(StatusMessage::success("Logged out successfully"))
    }
}

fn require_complete(credentials: &Credentials) -> std::result::Result<(), StatusMessage> {
    if credentials.is_complete() {
        Ok(())
    } else {
        Err(StatusMessage::error("Username and password are required"))
    }
}

fn failure_message(err: ExtensionError, fallback: &str) -> StatusMessage {
    log::warn!("{}: {}", fallback, err);
    match err {
        ExtensionError::Rejected(reason) => StatusMessage::error(reason),
        ExtensionError::Network(_) | ExtensionError::Decode(_) => {
            StatusMessage::error("Error connecting to server")
        }
        _ => StatusMessage::error(fallback),
    }
}
