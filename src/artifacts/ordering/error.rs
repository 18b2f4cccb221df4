//! Error types for the commit order index

use crate::artifacts::objects::object_id::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    /// A configured root reference does not name a commit
    #[error("Upstream reference {0} cannot be resolved")]
    UnreachableRoot(String),

    /// The commit is not reachable from any root
    #[error("Commit {0} not found in the upstream history")]
    NotFound(ObjectId),

    /// The commit is in no release and there is no release to extrapolate from
    #[error("No release tag precedes commit {0}")]
    NoRelease(ObjectId),

    /// Commits left over after topological sorting, only possible in a corrupt graph
    #[error("Commit graph contains a cycle: {0} commits could not be ordered")]
    Cycle(usize),

    #[error("Invalid tag pattern: {0}")]
    InvalidTagPattern(#[from] regex::Error),

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}
