//! Upstream commit ordering
//!
//! - `graph`: the commit graph abstraction and an in-memory implementation
//! - `release`: release tag timeline and next-release prediction
//! - `commit_order_index`: ranks and nearest release for every upstream commit
//! - `cache`: the index persisted between runs

pub mod cache;
pub mod commit_order_index;
pub mod error;
pub mod graph;
pub mod release;

#[cfg(test)]
pub(crate) mod fixtures;
