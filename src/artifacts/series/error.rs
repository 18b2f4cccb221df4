//! Error types for series processing

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::error::IndexError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Sorted subseries not found (no \"# sorted patches\" line)")]
    NoManagedRegion,

    #[error("Could not find patch \"{path}\"")]
    PatchNotFound { path: String },

    /// `line` is the line of the series document naming the patch
    #[error("Patch \"{path}\" (series line {line}): {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Patch \"{path}\" (series line {line}): commit {commit} not found")]
    CommitNotFound {
        path: String,
        line: usize,
        commit: ObjectId,
    },

    #[error("Patch \"{path}\" (series line {line}): no release tag contains commit {commit}")]
    NoRelease {
        path: String,
        line: usize,
        commit: ObjectId,
    },

    /// The provenance field vanished between parsing and rewriting
    #[error("Failed to update tag \"{field}\" in patch \"{path}\". This tag is not found.")]
    MissingField { path: String, field: String },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Unable to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
