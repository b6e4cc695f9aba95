//! assetpipe - declarative build orchestrator for front-end assets
//!
//! This library provides functionality to:
//! - Load a declarative `assetpipe.toml` and resolve its option cascade
//! - Register categorized, positionally-named build tasks
//! - Run per-category transform pipelines in parallel
//! - Watch sources and rebuild only the affected tasks
//! - Publish rebuild events to a live-reload bridge

pub mod cli;
pub mod config;
pub mod fsio;
pub mod outputs;
pub mod pipeline;
pub mod registry;
pub mod reload;
pub mod runner;
pub mod stages;
pub mod watch;
