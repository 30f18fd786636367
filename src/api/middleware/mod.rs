//! API middleware.
//!
//! Only admin routes are guarded; analysis and health are public.

pub mod admin;
