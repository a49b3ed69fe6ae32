//! # clinica
//!
//! Client core for the clinic appointment system: the session store, the
//! bearer-authenticated request pipeline with its token-refresh coordinator,
//! the role-based route guard, typed REST endpoints and display helpers.
//!
//! ARCHITECTURE
//! ============
//! Pages and layouts (the browser UI, or the `clinica` CLI) only touch this
//! crate through three seams: reading the [`session::SessionHandle`], issuing
//! requests through a [`net::ApiClient`], and asking [`guard::evaluate`]
//! whether a page may mount.
//!
//! ```text
//! caller -> ApiClient -> RefreshOnUnauthorized -> WithBearer -> transport
//!                              |                      |
//!                              +---- SessionHandle ---+
//! ```

pub mod auth;
pub mod config;
pub mod guard;
pub mod net;
pub mod session;
pub mod util;

#[cfg(test)]
mod test_helpers;
