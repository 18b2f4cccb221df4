//! On-disk components
//!
//! - `database`: object database (loose objects, packs, alternates)
//! - `pack`: pack index and pack file reading
//! - `refs`: references (HEAD, loose refs, packed-refs, tags)
//! - `repository`: the upstream repository as a commit graph
//! - `workspace`: the patch directory and atomic file replacement

pub mod database;
pub mod pack;
pub mod refs;
pub mod repository;
pub mod workspace;
