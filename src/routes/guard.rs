//! Role gates in front of dashboard views.

use crate::models::Role;
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    AdminOnly,
    ManagerOrAdmin,
    BuyerOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; nothing is rendered yet
    Pending,
    Authorized,
    Forbidden,
}

/// What a gated view ends up showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Children(T),
    /// Placeholder or forbidden page; the children never render
    Withheld(GuardDecision),
}

impl<T> Gate<T> {
    pub fn children(self) -> Option<T> {
        match self {
            Gate::Children(children) => Some(children),
            Gate::Withheld(_) => None,
        }
    }
}

impl Guard {
    pub fn allows(&self, role: Role) -> bool {
        match (self, role) {
            (Guard::AdminOnly, Role::Admin) => true,
            (Guard::AdminOnly, Role::Manager | Role::Buyer) => false,
            (Guard::ManagerOrAdmin, Role::Manager | Role::Admin) => true,
            (Guard::ManagerOrAdmin, Role::Buyer) => false,
            (Guard::BuyerOnly, Role::Buyer) => true,
            (Guard::BuyerOnly, Role::Manager | Role::Admin) => false,
        }
    }

    /// Decide against the session as it is right now
    pub fn evaluate(&self, state: SessionState) -> GuardDecision {
        match state {
            SessionState::Loading => GuardDecision::Pending,
            SessionState::Anonymous => GuardDecision::Forbidden,
            SessionState::Authenticated(role) if self.allows(role) => GuardDecision::Authorized,
            SessionState::Authenticated(_) => GuardDecision::Forbidden,
        }
    }

    /// Build the children only when the session is authorized
    pub fn gate<T, F>(&self, state: SessionState, children: F) -> Gate<T>
    where
        F: FnOnce() -> T,
    {
        match self.evaluate(state) {
            GuardDecision::Authorized => Gate::Children(children()),
            decision => Gate::Withheld(decision),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Guard::AdminOnly => "admin",
            Guard::ManagerOrAdmin => "manager",
            Guard::BuyerOnly => "buyer",
        }
    }
}
