pub mod bot;
pub mod cache;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod ingest;
pub mod store;
pub mod telegram;
