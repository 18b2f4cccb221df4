//! Git object types and operations
//!
//! Git stores all content as objects identified by SHA-1 hashes. The ordering
//! index reads only two kinds:
//!
//! - **Commit**: parent edges and author time
//! - **Tag**: annotated reference to a commit, carrying the release time
//!
//! Blobs and trees are recognised (pack entries and loose headers name them) but
//! never interpreted.

pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in binary format
pub const RAW_OBJECT_ID_LENGTH: usize = 20;
