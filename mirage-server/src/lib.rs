//! Library surface of the Mirage server, exposed for integration tests and
//! the binary entrypoint.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
