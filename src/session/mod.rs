//! Session context: who is logged in, with which token and role.
//!
//! The session is an explicit object handed to whatever needs it (the API
//! client, route guards, the CLI). It has three observable states: loading
//! (a token is known but the profile has not been fetched yet), anonymous,
//! and authenticated. Teardown is global and immediate: every holder of the
//! context sees the logout on its next read, and subscribers receive a
//! [`SessionEvent`] telling them to go back to the login page.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::models::{Role, User};

/// What guards and views see of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Token present, profile and role still being resolved
    Loading,
    Anonymous,
    Authenticated(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out
    UserRequested,
    /// The server answered 401/403
    Unauthorized,
    /// The profile behind the token could not be loaded
    ProfileUnavailable,
}

/// Broadcast on every session transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { email: String, role: Role },
    LoggedOut { reason: LogoutReason },
}

impl SessionEvent {
    /// Whether the front end should navigate to the login page
    pub fn redirects_to_login(&self) -> bool {
        matches!(
            self,
            SessionEvent::LoggedOut {
                reason: LogoutReason::Unauthorized | LogoutReason::ProfileUnavailable
            }
        )
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    token: Option<String>,
    user: Option<User>,
}

pub struct SessionContext {
    current: ArcSwap<Snapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// An anonymous session
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
            events,
        }
    }

    /// A session that holds a token whose profile is not resolved yet
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.begin(token);
        session
    }

    /// Store a token and enter the loading state
    pub fn begin(&self, token: impl Into<String>) {
        self.current.store(Arc::new(Snapshot {
            token: Some(token.into()),
            user: None,
        }));
    }

    /// Finish loading with the profile the server returned for `token`.
    ///
    /// Ignored when the session was torn down or moved on to another token
    /// while the profile was in flight.
    pub fn establish(&self, token: &str, user: User) -> bool {
        let email = user.email.clone();
        let role = user.role;
        let next = Snapshot {
            token: Some(token.to_string()),
            user: Some(user),
        };
        if !self.replace_if_current(token, next) {
            warn!(email = %email, "Profile arrived for a token no longer in use, ignoring");
            return false;
        }

        info!(email = %email, role = %role, "Session established");
        let _ = self.events.send(SessionEvent::LoggedIn { email, role });
        true
    }

    /// Token and profile known at once
    pub fn login(&self, token: impl Into<String>, user: User) {
        let token = token.into();
        self.begin(token.clone());
        self.establish(&token, user);
    }

    /// Drop token and profile. Returns false when there was nothing to drop.
    pub fn logout(&self, reason: LogoutReason) -> bool {
        let previous = self.current.swap(Arc::new(Snapshot::default()));
        if previous.token.is_none() {
            return false;
        }
        self.announce_logout(reason);
        true
    }

    /// Drop the session only while it still holds `token`
    pub fn end(&self, token: &str, reason: LogoutReason) -> bool {
        if !self.replace_if_current(token, Snapshot::default()) {
            return false;
        }
        self.announce_logout(reason);
        true
    }

    fn announce_logout(&self, reason: LogoutReason) {
        match reason {
            LogoutReason::UserRequested => info!("Logged out"),
            LogoutReason::Unauthorized => warn!("Session rejected by server, logging out"),
            LogoutReason::ProfileUnavailable => warn!("Profile could not be loaded, logging out"),
        }
        let _ = self.events.send(SessionEvent::LoggedOut { reason });
    }

    /// Swap in `next` only if the stored snapshot still carries `token`
    fn replace_if_current(&self, token: &str, next: Snapshot) -> bool {
        let next = Arc::new(next);
        loop {
            let current = self.current.load();
            if current.token.as_deref() != Some(token) {
                return false;
            }
            let previous = self.current.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&*previous, &*current) {
                return true;
            }
        }
    }

    pub fn state(&self) -> SessionState {
        let snapshot = self.current.load();
        match (&snapshot.token, &snapshot.user) {
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::Loading,
            (Some(_), Some(user)) => SessionState::Authenticated(user.role),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current.load().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.current.load().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        match self.state() {
            SessionState::Authenticated(role) => Some(role),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<String> {
        self.current.load().user.as_ref().map(|u| u.email.clone())
    }

    /// Receive session transitions from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
