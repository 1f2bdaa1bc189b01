//! Shortie - a deterministic URL shortener
//!
//! Short identifiers are derived from a hash of the target URL, redirects are
//! served over HTTP and visits are counted in best-effort daily buckets.
//!
//! # Architecture
//! - `storage`: storage contract with in-memory and DynamoDB backends
//! - `analytics`: day buckets, statistics aggregation, pending increment tracking
//! - `services`: identifier generation with collision extension
//! - `api`: HTTP routes and middleware
//! - `config`: static configuration
//! - `runtime`: startup, shutdown and execution modes
//! - `system`: logging setup

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
