//! Metrics module for the Flora server.
//!
//! Cache metrics are recorded by `flora-cache` itself; this module installs
//! the Prometheus recorder and adds the HTTP-level series.

pub mod http;
pub mod setup;

pub use setup::{detached_handle, init_metrics};
