pub mod cleanup;
pub mod client;
pub mod config;
pub mod filter;
pub mod types;
