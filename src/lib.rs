pub mod config;
pub mod fetch;
pub mod infra;
pub mod ingest;
pub mod output;
pub mod parser;
pub mod services;
pub mod stats;
pub mod sync;
pub mod title;
