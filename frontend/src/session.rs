//! Session state machine: decides whether the auth screen or the dashboard
//! is shown, and owns the persisted session triple.
//!
//! The backend is the only authority on credentials. Registration never
//! logs the user in, and passwords are never written to browser storage.
//! On page load a stored `authenticated` flag is trusted as-is, since the
//! backend still authorizes every request on its own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

use crate::api::{AuthApi, Credentials, Identity};
use crate::error::{ApiError, AuthError, ValidationError};
use crate::inflight::{Action, RequestTracker, Ticket};

pub const MIN_PASSWORD_LEN: usize = 8;

const KEY_AUTHENTICATED: &str = "authenticated";
const KEY_USER_ID: &str = "user_id";
const KEY_EMAIL: &str = "email";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionScope {
    /// Lives in `sessionStorage` and ends with the tab.
    TabScoped,
    /// Lives in `localStorage` and survives restarts.
    Persistent,
}

impl FromStr for SessionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tab" | "tab-scoped" | "session" => Ok(SessionScope::TabScoped),
            "persistent" | "local" => Ok(SessionScope::Persistent),
            other => Err(format!("unknown session scope `{}`", other)),
        }
    }
}

/// Key-value storage for the session triple.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// `sessionStorage` or `localStorage`, depending on scope.
#[derive(Debug, Clone, Copy)]
pub struct BrowserStore {
    scope: SessionScope,
}

impl BrowserStore {
    pub fn new(scope: SessionScope) -> Self {
        Self { scope }
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let storage = match self.scope {
            SessionScope::TabScoped => window.session_storage(),
            SessionScope::Persistent => window.local_storage(),
        };
        match storage {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("{:?} storage unavailable: {:?}", self.scope, err);
                None
            }
        }
    }
}

impl SessionStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = self.storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("could not persist `{}`", key);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = self.storage() {
            if storage.remove_item(key).is_err() {
                log::warn!("could not remove `{}`", key);
            }
        }
    }
}

fn check_credentials(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub struct SessionMachine<S: SessionStore> {
    store: S,
    scope: SessionScope,
    status: SessionStatus,
    identity: Option<Identity>,
    requests: RequestTracker,
}

impl<S: SessionStore> SessionMachine<S> {
    pub fn new(store: S, scope: SessionScope) -> Self {
        Self {
            store,
            scope,
            status: SessionStatus::Unauthenticated,
            identity: None,
            requests: RequestTracker::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn scope(&self) -> SessionScope {
        self.scope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_pending(&self, action: Action) -> bool {
        self.requests.is_pending(action)
    }

    /// Picks up a session left by an earlier page load. Incomplete leftovers
    /// are wiped.
    pub fn restore_on_load(&mut self) -> SessionStatus {
        let flagged = self.store.get(KEY_AUTHENTICATED).as_deref() == Some("true");
        let user_id = self.store.get(KEY_USER_ID);
        let email = self.store.get(KEY_EMAIL);

        match (flagged, user_id, email) {
            (true, Some(user_id), Some(email)) => {
                log::info!("restored {:?} session for {}", self.scope, email);
                self.identity = Some(Identity { user_id, email });
                self.status = SessionStatus::Authenticated;
            }
            (false, None, None) => {}
            _ => {
                log::warn!("discarding incomplete stored session");
                self.clear_persisted();
            }
        }
        self.status
    }

    fn begin(&mut self, action: Action) -> Result<Ticket, AuthError> {
        if self.requests.is_pending(Action::Login) || self.requests.is_pending(Action::Register) {
            return Err(AuthError::Busy);
        }
        self.requests.begin(action).ok_or(AuthError::Busy)
    }

    /// Validates a login attempt. Nothing is sent unless this succeeds.
    pub fn begin_login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(Ticket, Credentials), AuthError> {
        let credentials = check_credentials(email, password)?;
        let ticket = self.begin(Action::Login)?;
        Ok((ticket, credentials))
    }

    pub fn finish_login(
        &mut self,
        ticket: Ticket,
        result: Result<Identity, ApiError>,
    ) -> Result<Identity, AuthError> {
        if !self.requests.finish(ticket) {
            return Err(AuthError::Stale);
        }
        let identity = result.map_err(|err| {
            log::warn!("login rejected: {}", err);
            AuthError::from(err)
        })?;

        self.store.set(KEY_AUTHENTICATED, "true");
        self.store.set(KEY_USER_ID, &identity.user_id);
        self.store.set(KEY_EMAIL, &identity.email);
        self.identity = Some(identity.clone());
        self.status = SessionStatus::Authenticated;
        log::info!("logged in as {}", identity.email);
        Ok(identity)
    }

    pub fn begin_register(
        &mut self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(Ticket, Credentials), AuthError> {
        if confirm_password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }
        let credentials = check_credentials(email, password)?;
        if password != confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        let ticket = self.begin(Action::Register)?;
        Ok((ticket, credentials))
    }

    /// Registration leaves the session unauthenticated; the user logs in next.
    pub fn finish_register(
        &mut self,
        ticket: Ticket,
        result: Result<(), ApiError>,
    ) -> Result<(), AuthError> {
        if !self.requests.finish(ticket) {
            return Err(AuthError::Stale);
        }
        result.map_err(|err| {
            log::warn!("registration rejected: {}", err);
            AuthError::from(err)
        })?;
        log::info!("account created");
        Ok(())
    }

    pub fn logout(&mut self) {
        self.requests.abandon(Action::Login);
        self.requests.abandon(Action::Register);
        self.clear_persisted();
        self.identity = None;
        self.status = SessionStatus::Unauthenticated;
        log::info!("logged out");
    }

    /// Called when the tab goes away. Only tab-scoped sessions are wiped.
    pub fn terminate(&mut self) {
        if self.scope == SessionScope::TabScoped {
            self.clear_persisted();
        }
    }

    fn clear_persisted(&mut self) {
        self.store.remove(KEY_AUTHENTICATED);
        self.store.remove(KEY_USER_ID);
        self.store.remove(KEY_EMAIL);
    }
}

pub async fn login<S: SessionStore, A: AuthApi>(
    machine: &RefCell<SessionMachine<S>>,
    api: &A,
    email: &str,
    password: &str,
) -> Result<Identity, AuthError> {
    let (ticket, credentials) = machine.borrow_mut().begin_login(email, password)?;
    let result = api.login(&credentials).await;
    machine.borrow_mut().finish_login(ticket, result)
}

pub async fn register<S: SessionStore, A: AuthApi>(
    machine: &RefCell<SessionMachine<S>>,
    api: &A,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), AuthError> {
    let (ticket, credentials) =
        machine
            .borrow_mut()
            .begin_register(email, password, confirm_password)?;
    let result = api.register(&credentials).await;
    machine.borrow_mut().finish_register(ticket, result)
}
