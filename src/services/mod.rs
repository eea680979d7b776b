pub mod backend_api;
pub mod queries;
