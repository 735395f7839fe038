//! Core data models for the file storage service.
//!
//! Stored files carry no persisted metadata; access models describe who may
//! call which route.

pub mod access;
pub mod stored_file;
