//! Client-side destinations and the role gate in front of them.
//!
//! The guard is a pure function of the current session state and the
//! requested destination. It never touches the network and never mutates
//! the session.

use std::fmt;

use crate::session::{Role, Session, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Signup,
    Login,
    /// Landing page at `/`
    LearningCentre,
    Explore,
    Profile,
    Admin,
    Staff,
    LibraryStaff,
}

impl Destination {
    pub const ALL: [Destination; 8] = [
        Destination::Signup,
        Destination::Login,
        Destination::LearningCentre,
        Destination::Explore,
        Destination::Profile,
        Destination::Admin,
        Destination::Staff,
        Destination::LibraryStaff,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Destination::Signup => "/signup",
            Destination::Login => "/login",
            Destination::LearningCentre => "/",
            Destination::Explore => "/explore",
            Destination::Profile => "/profile",
            Destination::Admin => "/admin",
            Destination::Staff => "/staff",
            Destination::LibraryStaff => "/library-staff",
        }
    }

    /// Role a session must hold to view this destination, if any.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Destination::Signup | Destination::Login => None,
            Destination::LearningCentre | Destination::Explore | Destination::Profile => {
                Some(Role::User)
            }
            Destination::Admin => Some(Role::Admin),
            Destination::Staff => Some(Role::Staff),
            Destination::LibraryStaff => Some(Role::LibStaff),
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Self::ALL.into_iter().find(|d| d.path() == normalized)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(Destination),
}

/// The area a session lands in: ADMIN first, then STAFF, then LIB_STAFF,
/// otherwise the default area.
pub fn home_destination(session: &Session) -> Destination {
    if session.has_role(Role::Admin) {
        Destination::Admin
    } else if session.has_role(Role::Staff) {
        Destination::Staff
    } else if session.has_role(Role::LibStaff) {
        Destination::LibraryStaff
    } else {
        Destination::LearningCentre
    }
}

/// Decide whether `state` may view `destination`.
///
/// Destinations without a required role are always rendered. Otherwise an
/// unauthenticated visitor goes to login, and an authenticated visitor
/// lacking the role is sent to their own home area.
pub fn guard(state: &SessionState, destination: Destination) -> GuardDecision {
    let Some(required) = destination.required_role() else {
        return GuardDecision::Render;
    };

    match state {
        SessionState::Unauthenticated => GuardDecision::Redirect(Destination::Login),
        SessionState::Authenticated(session) if !session.has_role(required) => {
            GuardDecision::Redirect(home_destination(session))
        }
        SessionState::Authenticated(_) => GuardDecision::Render,
    }
}
