//! Persisted upstream order index
//!
//! Walking a kernel history means loading about a million commits. The result
//! only depends on the resolved roots and on the release tags, so it is stored
//! in a cache file together with those inputs and reused while they match.
//!
//! ## Format
//!
//! A single bincode-encoded [`IndexSnapshot`]. A file that does not decode, or
//! that was written for other inputs or by another [`CACHE_VERSION`], is ignored
//! and replaced by the next build.

use crate::areas::workspace::write_atomic;
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::graph::TagRef;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bumped whenever the snapshot layout or the ordering rules change
pub const CACHE_VERSION: u32 = 1;

pub type RawObjectId = [u8; RAW_OBJECT_ID_LENGTH];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTag {
    pub name: String,
    pub target: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&TagRef> for CachedTag {
    fn from(tag: &TagRef) -> Self {
        CachedTag {
            name: tag.name.clone(),
            target: tag.target.to_string(),
            timestamp: tag.timestamp,
        }
    }
}

impl TryFrom<CachedTag> for TagRef {
    type Error = anyhow::Error;

    fn try_from(tag: CachedTag) -> Result<Self, Self::Error> {
        Ok(TagRef::new(
            tag.name,
            ObjectId::try_parse(tag.target)?,
            tag.timestamp,
        ))
    }
}

/// Everything an index is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub version: u32,
    /// Configured root names with the commits they resolved to
    pub roots: Vec<(String, String)>,
    pub tag_pattern: String,
    /// Tags matching the pattern, sorted by name then target
    pub tags: Vec<CachedTag>,
}

impl CacheKey {
    pub fn new(roots: &[(String, ObjectId)], tag_pattern: &regex::Regex, tags: &[TagRef]) -> Self {
        let mut tags = tags.iter().map(CachedTag::from).collect::<Vec<_>>();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.target.cmp(&b.target)));

        CacheKey {
            version: CACHE_VERSION,
            roots: roots
                .iter()
                .map(|(name, oid)| (name.clone(), oid.to_string()))
                .collect(),
            tag_pattern: tag_pattern.as_str().to_string(),
            tags,
        }
    }
}

/// A built index in storable form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub key: CacheKey,
    /// Commits in rank order
    pub order: Vec<RawObjectId>,
    /// Number of commits in each release line, upcoming line last
    pub line_lengths: Vec<usize>,
    /// Release tags in timeline order
    pub timeline: Vec<CachedTag>,
}

#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new(path: PathBuf) -> Self {
        IndexCache { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored snapshot, `None` when there is none or it cannot be decoded
    pub fn load(&self) -> Option<IndexSnapshot> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), "unable to read index cache: {error}");
                return None;
            }
        };

        match bincode::deserialize(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable index cache: {error}");
                None
            }
        }
    }

    pub fn store(&self, snapshot: &IndexSnapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }

        let bytes = bincode::serialize(snapshot).context("Unable to encode index cache")?;
        write_atomic(&self.path, &bytes)
            .with_context(|| format!("Unable to write index cache {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), commits = snapshot.order.len(), "stored index cache");

        Ok(())
    }
}
