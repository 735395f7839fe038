//! Middleware for cross-cutting request processing.
//!
//! - [`access_control`]: evaluates the authorization policy before any
//!   handler or storage code runs.

pub mod access_control;
