//! imgdrop API library
//!
//! HTTP surface of the upload service: routes, handlers, the upload pipeline,
//! middleware and application setup.

mod handlers;
mod middleware;
mod services;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
