//! OmniLink HTTP API.
//!
//! Public intake (leads, reviews, contractor signup), contractor dashboard
//! endpoints behind a JWT, and admin actions behind the shared admin secret.

pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;
