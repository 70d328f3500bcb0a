//! # dash_app
//!
//! Shared utilities for dashboard command-line tools

pub mod cli;
pub mod config_loader;
pub mod tracing_setup;
