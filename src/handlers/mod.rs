pub mod file_handlers;
