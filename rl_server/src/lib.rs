//! HTTP server for the recording ledger.
//!
//! Exposes crediting, balance and withdrawal over JSON, with request
//! correlation, structured logging and optional Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
