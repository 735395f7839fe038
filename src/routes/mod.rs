pub mod policy;
#[allow(clippy::module_inception)]
pub mod routes;
