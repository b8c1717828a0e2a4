//! Event bulletin service
//!
//! A single shared calendar of events with a public read API and a
//! token-authenticated admin write API. Sessions are opaque bearer tokens
//! persisted with an absolute expiry and reclaimed by a periodic sweep.

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod sweeper;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
