//! Commit graph abstraction
//!
//! The index is built from anything that can resolve a root reference, load a
//! commit and enumerate tags. [`Repository`](crate::areas::repository::Repository)
//! reads an on-disk git repository; [`InMemoryGraph`] holds a hand-built graph.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use chrono::{DateTime, FixedOffset};
use derive_new::new;
use std::collections::HashMap;

/// A tag peeled to the commit it names
///
/// `timestamp` is the tagger time of an annotated tag, or the author time of the
/// tagged commit for a lightweight tag.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TagRef {
    /// Short name, without `refs/tags/`
    pub name: String,
    pub target: ObjectId,
    pub timestamp: DateTime<FixedOffset>,
}

pub trait CommitGraph {
    /// Resolve a root reference to a commit, `None` if it names nothing
    fn resolve_root(&self, name: &str) -> anyhow::Result<Option<ObjectId>>;

    fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit>;

    /// Every tag that peels to a commit
    fn tags(&self) -> anyhow::Result<Vec<TagRef>>;
}

/// Commit graph held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryGraph {
    commits: HashMap<ObjectId, SlimCommit>,
    refs: HashMap<String, ObjectId>,
    tags: Vec<TagRef>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commit(
        &mut self,
        oid: ObjectId,
        parents: Vec<ObjectId>,
        timestamp: DateTime<FixedOffset>,
    ) -> &mut Self {
        self.commits.insert(
            oid.clone(),
            SlimCommit {
                oid,
                parents,
                timestamp,
            },
        );
        self
    }

    pub fn add_ref(&mut self, name: impl Into<String>, oid: ObjectId) -> &mut Self {
        self.refs.insert(name.into(), oid);
        self
    }

    pub fn add_tag(
        &mut self,
        name: impl Into<String>,
        target: ObjectId,
        timestamp: DateTime<FixedOffset>,
    ) -> &mut Self {
        self.tags.push(TagRef::new(name.into(), target, timestamp));
        self
    }
}

impl CommitGraph for InMemoryGraph {
    fn resolve_root(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        if let Some(oid) = self.refs.get(name) {
            return Ok(Some(oid.clone()));
        }

        Ok(self
            .commits
            .keys()
            .find(|oid| oid.as_ref() == name)
            .cloned())
    }

    fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        self.commits
            .get(oid)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Commit {} not found", oid))
    }

    fn tags(&self) -> anyhow::Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }
}
