pub mod elastic_pool;
pub mod error;
pub mod server;
