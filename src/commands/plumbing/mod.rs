//! Plumbing commands
//!
//! - `rank`: print the position of a commit in the upstream order
//! - `describe`: print the earliest release containing a commit
//! - `heads`: compare the cached index inputs with the current ones

pub mod describe;
pub mod heads;
pub mod rank;
