pub mod file_service;
pub mod identity_service;
