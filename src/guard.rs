//! Role-based route protection.
//!
//! DESIGN
//! ======
//! The guard is a pure function of a [`Session`] snapshot and the page's
//! allowed roles. It runs before a protected page mounts and never touches
//! the network: a session restored from storage without an access token
//! passes here and the first request goes through the refresh path.
//!
//! The role → home mapping lives only in [`home_path`]; post-login
//! navigation and the wrong-role redirect both go through it.
//!
//! TRADE-OFFS
//! ==========
//! Between `set_tokens` and `set_user` the session is authenticated with no
//! known role. Role-restricted pages answer [`GuardDecision::AwaitProfile`]
//! in that window instead of rendering for an unknown role; role-agnostic
//! pages render.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::Role;
use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const LANDING_PATH: &str = "/";

/// Landing used by `/login` and `/register` when the role is not known yet.
pub const DEFAULT_HOME: &str = "/app/dashboard";

/// What the router should do with a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Mount the page.
    Render,
    /// Replace the current location with this path.
    Redirect(&'static str),
    /// Authenticated but the profile has not loaded; show a placeholder.
    AwaitProfile,
}

/// Dashboard each role lands on after login or a wrong-role redirect.
#[must_use]
pub fn home_path(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/dashboard",
        Role::Doctor => "/doctor/dashboard",
        Role::Patient => "/app/dashboard",
    }
}

/// Decide whether a protected page may mount.
///
/// `allowed_roles == None` means any authenticated user.
#[must_use]
pub fn evaluate(session: &Session, allowed_roles: Option<&[Role]>) -> GuardDecision {
    if !session.is_authenticated {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    let Some(allowed) = allowed_roles else {
        return GuardDecision::Render;
    };
    match session.role() {
        Some(role) if allowed.contains(&role) => GuardDecision::Render,
        Some(role) => GuardDecision::Redirect(home_path(role)),
        None => GuardDecision::AwaitProfile,
    }
}

/// Redirect applied to public pages for a session that is already signed in.
#[must_use]
pub fn public_redirect(session: &Session, path: &str) -> Option<&'static str> {
    if !session.is_authenticated {
        return None;
    }
    let role_home = session.role().map(home_path);
    match normalize(path) {
        LANDING_PATH => role_home,
        LOGIN_PATH | REGISTER_PATH => Some(role_home.unwrap_or(DEFAULT_HOME)),
        _ => None,
    }
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// Who may open a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Roles(&'static [Role]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Path pattern; `:name` segments match any single segment.
    pub pattern: &'static str,
    pub page: &'static str,
    pub access: Access,
}

const PATIENT: &[Role] = &[Role::Patient];
const DOCTOR: &[Role] = &[Role::Doctor];
const ADMIN: &[Role] = &[Role::Admin];

pub const ROUTES: &[Route] = &[
    Route { pattern: "/", page: "landing", access: Access::Public },
    Route { pattern: "/login", page: "login", access: Access::Public },
    Route { pattern: "/register", page: "register", access: Access::Public },
    Route { pattern: "/app/dashboard", page: "patient.dashboard", access: Access::Roles(PATIENT) },
    Route { pattern: "/app/appointments", page: "patient.appointments", access: Access::Roles(PATIENT) },
    Route { pattern: "/app/doctors", page: "patient.doctors", access: Access::Roles(PATIENT) },
    Route { pattern: "/app/schedule/:doctorId", page: "patient.schedule", access: Access::Roles(PATIENT) },
    Route { pattern: "/app/payment/:appointmentId", page: "patient.payment", access: Access::Roles(PATIENT) },
    Route { pattern: "/app/profile", page: "patient.profile", access: Access::Roles(PATIENT) },
    Route { pattern: "/doctor/dashboard", page: "doctor.dashboard", access: Access::Roles(DOCTOR) },
    Route { pattern: "/doctor/agenda", page: "doctor.agenda", access: Access::Roles(DOCTOR) },
    Route { pattern: "/admin/dashboard", page: "admin.dashboard", access: Access::Roles(ADMIN) },
    Route { pattern: "/admin/users", page: "admin.users", access: Access::Roles(ADMIN) },
];

impl Route {
    /// Match `path` against the pattern, returning `:name` captures in order.
    #[must_use]
    pub fn matches<'p>(&self, path: &'p str) -> Option<Vec<(&'static str, &'p str)>> {
        let mut wanted = self.pattern.split('/').filter(|s| !s.is_empty());
        let mut given = normalize(path).split('/').filter(|s| !s.is_empty());
        let mut params = Vec::new();
        loop {
            match (wanted.next(), given.next()) {
                (None, None) => return Some(params),
                (Some(w), Some(g)) => {
                    if let Some(name) = w.strip_prefix(':') {
                        params.push((name, g));
                    } else if w != g {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

/// Look up the route serving `path`. Query strings and fragments are ignored.
#[must_use]
pub fn route_for(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.matches(path).is_some())
}

/// Full router decision for a location: public redirects, then the guard.
/// Unknown paths render (the not-found page is public).
#[must_use]
pub fn evaluate_path(session: &Session, path: &str) -> GuardDecision {
    let Some(route) = route_for(path) else {
        return GuardDecision::Render;
    };
    match route.access {
        Access::Public => public_redirect(session, path).map_or(GuardDecision::Render, GuardDecision::Redirect),
        Access::Roles(roles) => evaluate(session, Some(roles)),
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
