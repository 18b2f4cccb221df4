//! Run configuration
//!
//! Everything a run depends on is gathered here and passed down explicitly;
//! nothing below the binary reads environment variables or the working
//! directory on its own.

use crate::artifacts::ordering::error::IndexError;
use crate::artifacts::ordering::release::DEFAULT_TAG_PATTERN;
use crate::artifacts::series::patch::PatchFields;
use regex::Regex;
use std::path::PathBuf;

pub const DEFAULT_UPSTREAM: &str = "HEAD";

#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Upstream git directory, taking precedence over `linux_git`
    pub git_dir: Option<PathBuf>,
    /// Upstream kernel checkout
    pub linux_git: Option<PathBuf>,
    /// Revisions whose history forms the upstream order
    pub upstream: Vec<String>,
    /// Short tag names counted as releases
    pub tag_pattern: Regex,
    pub fields: PatchFields,
    /// File holding the index between runs; `None` rebuilds it every time
    pub cache_path: Option<PathBuf>,
}

impl SortConfig {
    /// Configuration following `HEAD` with the default release tag pattern
    pub fn new() -> Result<Self, IndexError> {
        Ok(SortConfig {
            git_dir: None,
            linux_git: None,
            upstream: vec![DEFAULT_UPSTREAM.to_string()],
            tag_pattern: Regex::new(DEFAULT_TAG_PATTERN)?,
            fields: PatchFields::default(),
            cache_path: None,
        })
    }

    pub fn with_tag_pattern(mut self, pattern: &str) -> Result<Self, IndexError> {
        self.tag_pattern = Regex::new(pattern)?;
        Ok(self)
    }

    pub fn with_cache_path(mut self, cache_path: Option<PathBuf>) -> Self {
        self.cache_path = cache_path;
        self
    }

    pub fn with_upstream(mut self, upstream: Vec<String>) -> Self {
        if !upstream.is_empty() {
            self.upstream = upstream;
        }
        self
    }
}
