pub mod bank;
pub mod config;
pub mod engine;
pub mod scoring;
pub mod store;
