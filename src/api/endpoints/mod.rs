//! API endpoint handlers.
//!
//! Handlers are thin: decode, call the engine, encode.

pub mod admin;
pub mod analyze;
pub mod health;
