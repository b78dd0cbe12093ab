pub mod config;
pub mod decoder;
pub mod extractor;
pub mod fetcher;
pub mod harvest;
pub mod policy;
pub mod sink;
