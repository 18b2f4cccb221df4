//! Release timeline
//!
//! The ordered list of release tags that partitions upstream history into
//! release lines, and the label given to commits that no release contains yet.

use crate::artifacts::ordering::graph::TagRef;
use std::collections::HashSet;

/// Mainline release tags: `v2.6.X` and `vX.Y`, optionally `-rcN`
pub const DEFAULT_TAG_PATTERN: &str = r"^v(2\.6\.\d+|\d+\.\d+)(-rc\d+)?$";

/// Shape of a tag from which the next release name can be predicted
const NEXT_RELEASE_REGEX: &str = r"v([0-9]+)\.([0-9]+)(-rc([0-9]+))?$";

#[derive(Debug, Clone, Default)]
pub struct ReleaseTimeline {
    tags: Vec<TagRef>,
}

impl ReleaseTimeline {
    /// Keep the tags matching `pattern` whose target satisfies `reachable`
    ///
    /// Tags are ordered by release time; tags created at the same second are
    /// ordered by name.
    pub fn new(
        tags: Vec<TagRef>,
        pattern: &regex::Regex,
        reachable: impl Fn(&TagRef) -> bool,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut tags = tags
            .into_iter()
            .filter(|tag| pattern.is_match(&tag.name))
            .filter(|tag| {
                let keep = reachable(tag);
                if !keep {
                    tracing::debug!(tag = %tag.name, "skipping tag outside the indexed history");
                }
                keep
            })
            .filter(|tag| seen.insert(tag.name.clone()))
            .collect::<Vec<_>>();

        tags.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.name.cmp(&b.name))
        });

        ReleaseTimeline { tags }
    }

    /// Tags already filtered and in timeline order, as stored in an index cache
    pub(crate) fn from_ordered(tags: Vec<TagRef>) -> Self {
        ReleaseTimeline { tags }
    }

    pub fn tags(&self) -> &[TagRef] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn newest(&self) -> Option<&TagRef> {
        self.tags.last()
    }

    /// Name of the release that will contain commits past the newest tag
    ///
    /// After `vX.Y` comes `vX.(Y+1)-rc1`. After `vX.Y-rcN` it is either the final
    /// release or the next candidate, and the label says so.
    pub fn upcoming_label(&self) -> Option<String> {
        let newest = self.newest()?;
        let regex = regex::Regex::new(NEXT_RELEASE_REGEX).ok()?;
        let captures = regex.captures(&newest.name)?;

        let major = &captures[1];
        let minor = captures[2].parse::<u64>().ok()?;

        match captures.get(4) {
            None => Some(format!("v{}.{}-rc1", major, minor + 1)),
            Some(rc) => {
                let rc = rc.as_str().parse::<u64>().ok()?;
                Some(format!(
                    "v{major}.{minor} or v{major}.{minor}-rc{} (next release)",
                    rc + 1
                ))
            }
        }
    }
}
