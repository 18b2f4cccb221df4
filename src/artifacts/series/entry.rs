use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::commit_order_index::Rank;

/// A patch of the managed region, resolved against the upstream index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEntry {
    /// Patch path relative to the patch directory
    pub name: String,
    /// Line of the series document naming the patch
    pub line: usize,
    pub commit: ObjectId,
    pub rank: Rank,
    /// Provenance tag found in the patch
    pub recorded_tag: String,
    /// Nearest upstream release containing `commit`
    pub expected_tag: String,
}

impl SeriesEntry {
    pub fn needs_update(&self) -> bool {
        self.recorded_tag != self.expected_tag
    }

    /// The canonical series line for this entry
    pub fn render(&self) -> String {
        format!("\t{}\n", self.name)
    }
}
