//! CalBot API: library crate for the conversational scheduling server.
//!
//! Exposes `AppState`, `build_router` and the config so the binary
//! (`main.rs`) and `cb-e2e-tests` can assemble the same server.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use routes::build_router;
pub use state::AppState;
