//! Minimal file storage over HTTP.
//!
//! Clients upload, replace, delete and fetch files by name. Reads are public;
//! every other route goes through HTTP Basic authentication against a single
//! configured admin identity. Files are stored flat on local disk.

pub mod config;
pub mod docs;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes::app;
