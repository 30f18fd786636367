//! HTTP surface of the diagnostic engine.
//!
//! `api_router()` returns a composable `Router`; `start_server()` binds
//! it and runs it in the background until shut down.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerSession};
pub use types::ApiContext;
