//! Upstream commit order index
//!
//! Assigns every commit reachable from the configured roots a unique rank that
//! is consistent with ancestry, and records the earliest release containing it.
//!
//! ## Algorithm
//!
//! 1. Walk the history from all roots over every parent edge.
//! 2. Order the release tags reached by the walk by release time (see
//!    [`ReleaseTimeline`]).
//! 3. Split history into release lines: line `i` holds the ancestors of tag `i`
//!    not already held by an earlier line. Whatever no tag contains forms a
//!    final "upcoming" line.
//! 4. Topologically sort each line with Kahn's algorithm, always emitting the
//!    ready commit with the smallest `(author time, hash)`.
//! 5. Concatenate the lines; a commit's rank is its position in the result.
//!
//! A parent always sits in the same or an earlier line than its child, so the
//! concatenation keeps every ancestor ahead of its descendants.
//!
//! [`CommitOrderIndex::build_cached`] skips all of this while an
//! [`IndexCache`] holds an index built from the same roots and release tags.

use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::cache::{CacheKey, CachedTag, IndexCache, IndexSnapshot};
use crate::artifacts::ordering::error::IndexError;
use crate::artifacts::ordering::graph::{CommitGraph, TagRef};
use crate::artifacts::ordering::release::ReleaseTimeline;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// Position of a commit in the upstream order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(usize);

impl Rank {
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    rank: Rank,
    line: usize,
}

#[derive(Debug)]
pub struct CommitOrderIndex {
    placements: HashMap<ObjectId, Placement>,
    timeline: ReleaseTimeline,
    upcoming_label: Option<String>,
}

impl CommitOrderIndex {
    /// Build the index over everything reachable from `roots`
    pub fn build<G>(
        graph: &G,
        roots: &[String],
        tag_pattern: &regex::Regex,
    ) -> Result<Self, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let root_oids = Self::resolve_roots(graph, roots)?
            .into_iter()
            .map(|(_, oid)| oid)
            .collect();

        Self::build_from(graph, root_oids, graph.tags()?, tag_pattern)
    }

    /// Build the index, or load it from `cache` if it was built from the same inputs
    ///
    /// Roots and tags are always resolved; commits are only loaded on a miss. A
    /// cache that cannot be written is logged and otherwise ignored.
    pub fn build_cached<G>(
        graph: &G,
        roots: &[String],
        tag_pattern: &regex::Regex,
        cache: &IndexCache,
    ) -> Result<Self, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let (key, root_oids, tags) = Self::inputs(graph, roots, tag_pattern)?;

        match cache.load() {
            Some(snapshot) if snapshot.key == key => match Self::from_snapshot(snapshot) {
                Ok(index) => {
                    tracing::debug!(path = %cache.path().display(), "reusing cached index");
                    return Ok(index);
                }
                Err(error) => {
                    tracing::warn!(path = %cache.path().display(), "ignoring index cache: {error:#}")
                }
            },
            Some(_) => tracing::debug!("upstream heads or tags changed, rebuilding index"),
            None => tracing::debug!("no usable index cache, rebuilding index"),
        }

        let index = Self::build_from(graph, root_oids, tags, tag_pattern)?;
        if let Err(error) = index
            .to_snapshot(key)
            .and_then(|snapshot| cache.store(&snapshot))
        {
            tracing::warn!("{error:#}");
        }

        Ok(index)
    }

    /// The cache key an index of `roots` would be stored under
    pub fn cache_key<G>(
        graph: &G,
        roots: &[String],
        tag_pattern: &regex::Regex,
    ) -> Result<CacheKey, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        Self::inputs(graph, roots, tag_pattern).map(|(key, _, _)| key)
    }

    fn inputs<G>(
        graph: &G,
        roots: &[String],
        tag_pattern: &regex::Regex,
    ) -> Result<(CacheKey, Vec<ObjectId>, Vec<TagRef>), IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let resolved = Self::resolve_roots(graph, roots)?;
        let tags = graph
            .tags()?
            .into_iter()
            .filter(|tag| tag_pattern.is_match(&tag.name))
            .collect::<Vec<_>>();
        let key = CacheKey::new(&resolved, tag_pattern, &tags);

        Ok((key, resolved.into_iter().map(|(_, oid)| oid).collect(), tags))
    }

    fn resolve_roots<G>(graph: &G, roots: &[String]) -> Result<Vec<(String, ObjectId)>, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let mut resolved = Vec::with_capacity(roots.len());
        for root in roots {
            let oid = graph
                .resolve_root(root)?
                .ok_or_else(|| IndexError::UnreachableRoot(root.clone()))?;
            tracing::debug!(root = %root, %oid, "resolved upstream root");
            resolved.push((root.clone(), oid));
        }

        Ok(resolved)
    }

    fn build_from<G>(
        graph: &G,
        root_oids: Vec<ObjectId>,
        tags: Vec<TagRef>,
        tag_pattern: &regex::Regex,
    ) -> Result<Self, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let commits = Self::walk(graph, root_oids)?;
        tracing::debug!(commits = commits.len(), "walked upstream history");

        let timeline = ReleaseTimeline::new(tags, tag_pattern, |tag| {
            commits.contains_key(&tag.target)
        });
        tracing::debug!(
            releases = timeline.len(),
            newest = timeline.newest().map(|tag| tag.name.as_str()),
            "collected release tags"
        );

        let (lines, line_of) = Self::split_lines(&commits, timeline.tags());

        let mut placements = HashMap::with_capacity(commits.len());
        for (line, members) in lines.iter().enumerate() {
            for commit in Self::sort_line(members, line, &line_of)? {
                let rank = Rank(placements.len());
                placements.insert(commit.oid.clone(), Placement { rank, line });
            }
        }

        let upcoming_label = timeline.upcoming_label();

        Ok(CommitOrderIndex {
            placements,
            timeline,
            upcoming_label,
        })
    }

    fn to_snapshot(&self, key: CacheKey) -> anyhow::Result<IndexSnapshot> {
        let mut order = vec![[0; RAW_OBJECT_ID_LENGTH]; self.placements.len()];
        let mut line_lengths = vec![0; self.timeline.len() + 1];

        for (oid, placement) in &self.placements {
            order[placement.rank.0] = oid.to_raw()?;
            line_lengths[placement.line] += 1;
        }

        Ok(IndexSnapshot {
            key,
            order,
            line_lengths,
            timeline: self.timeline.tags().iter().map(CachedTag::from).collect(),
        })
    }

    fn from_snapshot(snapshot: IndexSnapshot) -> anyhow::Result<Self> {
        anyhow::ensure!(
            snapshot.line_lengths.len() == snapshot.timeline.len() + 1
                && snapshot.line_lengths.iter().sum::<usize>() == snapshot.order.len(),
            "release lines do not add up to the cached commits"
        );

        let lines = snapshot
            .line_lengths
            .iter()
            .enumerate()
            .flat_map(|(line, length)| std::iter::repeat_n(line, *length));
        let placements = snapshot
            .order
            .iter()
            .zip(lines)
            .enumerate()
            .map(|(rank, (raw, line))| {
                let placement = Placement {
                    rank: Rank(rank),
                    line,
                };
                (ObjectId::from_raw(raw), placement)
            })
            .collect();

        let tags = snapshot
            .timeline
            .into_iter()
            .map(TagRef::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let timeline = ReleaseTimeline::from_ordered(tags);
        let upcoming_label = timeline.upcoming_label();

        Ok(CommitOrderIndex {
            placements,
            timeline,
            upcoming_label,
        })
    }

    fn walk<G>(
        graph: &G,
        roots: Vec<ObjectId>,
    ) -> Result<HashMap<ObjectId, SlimCommit>, IndexError>
    where
        G: CommitGraph + ?Sized,
    {
        let mut commits = HashMap::new();
        let mut pending = roots;

        while let Some(oid) = pending.pop() {
            if commits.contains_key(&oid) {
                continue;
            }

            let commit = graph.load_commit(&oid)?;
            pending.extend(
                commit
                    .parents
                    .iter()
                    .filter(|parent| !commits.contains_key(*parent))
                    .cloned(),
            );
            commits.insert(oid, commit);
        }

        Ok(commits)
    }

    /// Group commits by the first release (in timeline order) containing them
    #[allow(clippy::type_complexity)]
    fn split_lines<'c>(
        commits: &'c HashMap<ObjectId, SlimCommit>,
        tags: &[TagRef],
    ) -> (Vec<Vec<&'c SlimCommit>>, HashMap<&'c ObjectId, usize>) {
        let mut line_of: HashMap<&ObjectId, usize> = HashMap::with_capacity(commits.len());
        let mut lines = vec![Vec::new(); tags.len() + 1];

        for (line, tag) in tags.iter().enumerate() {
            let mut pending = vec![&tag.target];

            while let Some(oid) = pending.pop() {
                if line_of.contains_key(oid) {
                    continue;
                }
                let Some(commit) = commits.get(oid) else {
                    continue;
                };

                line_of.insert(&commit.oid, line);
                lines[line].push(commit);
                pending.extend(commit.parents.iter());
            }
        }

        let upcoming = tags.len();
        for commit in commits.values() {
            if !line_of.contains_key(&commit.oid) {
                line_of.insert(&commit.oid, upcoming);
                lines[upcoming].push(commit);
            }
        }

        (lines, line_of)
    }

    /// Kahn's algorithm over one release line
    ///
    /// Only parent edges inside the line constrain the order; parents in earlier
    /// lines are already placed.
    fn sort_line<'c>(
        members: &[&'c SlimCommit],
        line: usize,
        line_of: &HashMap<&ObjectId, usize>,
    ) -> Result<Vec<&'c SlimCommit>, IndexError> {
        let mut pending_parents: HashMap<&ObjectId, usize> = HashMap::with_capacity(members.len());
        let mut children: HashMap<&ObjectId, Vec<&'c SlimCommit>> = HashMap::new();

        for &commit in members {
            let in_line = commit
                .parents
                .iter()
                .filter(|parent| line_of.get(parent) == Some(&line))
                .collect::<Vec<_>>();

            for parent in &in_line {
                children.entry(*parent).or_default().push(commit);
            }
            pending_parents.insert(&commit.oid, in_line.len());
        }

        let mut ready = members
            .iter()
            .filter(|commit| pending_parents.get(&commit.oid) == Some(&0))
            .map(|commit| Reverse(*commit))
            .collect::<BinaryHeap<_>>();

        let mut sorted = Vec::with_capacity(members.len());
        while let Some(Reverse(commit)) = ready.pop() {
            sorted.push(commit);

            for child in children.get(&commit.oid).into_iter().flatten() {
                if let Some(count) = pending_parents.get_mut(&child.oid) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse(*child));
                    }
                }
            }
        }

        if sorted.len() != members.len() {
            return Err(IndexError::Cycle(members.len() - sorted.len()));
        }

        Ok(sorted)
    }

    pub fn rank(&self, oid: &ObjectId) -> Result<Rank, IndexError> {
        self.placement(oid).map(|placement| placement.rank)
    }

    /// Name of the earliest release containing `oid`
    ///
    /// Commits past the newest release get a predicted label such as
    /// `v4.11-rc1`, or [`IndexError::NoRelease`] when nothing can be predicted.
    pub fn nearest_tag(&self, oid: &ObjectId) -> Result<String, IndexError> {
        let placement = self.placement(oid)?;

        match self.timeline.tags().get(placement.line) {
            Some(tag) => Ok(tag.name.clone()),
            None => self
                .upcoming_label
                .clone()
                .ok_or_else(|| IndexError::NoRelease(oid.clone())),
        }
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.placements.contains_key(oid)
    }

    pub fn compare(&self, a: &ObjectId, b: &ObjectId) -> Result<Ordering, IndexError> {
        Ok(self.rank(a)?.cmp(&self.rank(b)?))
    }

    /// Release tags in timeline order
    pub fn tags(&self) -> &[TagRef] {
        self.timeline.tags()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn placement(&self, oid: &ObjectId) -> Result<Placement, IndexError> {
        self.placements
            .get(oid)
            .copied()
            .ok_or_else(|| IndexError::NotFound(oid.clone()))
    }
}
