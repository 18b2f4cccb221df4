//! Keep a backport patch series in upstream commit order
//!
//! - `areas`: the on-disk upstream repository and the patch directory
//! - `artifacts`: git objects, the commit order index and series handling
//! - `commands`: the `series`, `sort`, `rank` and `describe` commands
//! - `config`: run configuration
//! - `telemetry`: tracing setup for the binary

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod telemetry;
