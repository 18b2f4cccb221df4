//! Series file handling
//!
//! - `document`: splitting a series file around its managed region
//! - `patch`: reading and rewriting patch header fields
//! - `entry`: a managed patch resolved to its upstream commit
//! - `sorter`: sorting entries and reconciling provenance tags

pub mod document;
pub mod entry;
pub mod error;
pub mod patch;
pub mod sorter;
