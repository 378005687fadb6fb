#[cfg(feature = "config")]
pub mod config;
pub mod constants;
pub mod models;
pub mod tags;
