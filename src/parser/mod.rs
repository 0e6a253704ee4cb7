pub mod config;
pub mod snapshot;
