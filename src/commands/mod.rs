//! Command implementations
//!
//! - `porcelain`: commands working on a patch series (`series`, `sort`)
//! - `plumbing`: point queries against the upstream order (`rank`, `describe`)

use crate::areas::repository::Repository;
use crate::artifacts::ordering::cache::IndexCache;
use crate::artifacts::ordering::commit_order_index::CommitOrderIndex;
use crate::artifacts::ordering::error::IndexError;
use crate::config::SortConfig;

pub mod plumbing;
pub mod porcelain;

impl Repository {
    /// Index the history of the configured upstream roots, through the cache if one is set
    pub fn build_index(&self, config: &SortConfig) -> Result<CommitOrderIndex, IndexError> {
        let index = match &config.cache_path {
            Some(path) => CommitOrderIndex::build_cached(
                self,
                &config.upstream,
                &config.tag_pattern,
                &IndexCache::new(path.clone()),
            )?,
            None => CommitOrderIndex::build(self, &config.upstream, &config.tag_pattern)?,
        };

        tracing::debug!(
            commits = index.len(),
            releases = index.tags().len(),
            "built upstream order index"
        );

        Ok(index)
    }
}
