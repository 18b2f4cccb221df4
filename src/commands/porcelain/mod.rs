//! Porcelain commands
//!
//! - `series`: sort the managed region of a series file and refresh provenance tags
//! - `sort`: sort arbitrary lines keyed by a leading commit revision

pub mod series;
pub mod sort;
