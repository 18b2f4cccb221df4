//! Series sorting and provenance reconciliation
//!
//! ## Flow
//!
//! 1. [`SeriesSorter::parse_entries`] reads every patch of the managed region and
//!    resolves its commit against the index. Nothing is written until every
//!    entry resolved.
//! 2. [`SeriesSorter::sort`] orders entries by upstream rank (stable).
//! 3. [`SeriesSorter::compute_updates`] picks entries whose recorded provenance
//!    tag differs from the nearest release.
//! 4. Either [`SeriesSorter::check_sorted`] answers whether anything would
//!    change, or [`SeriesSorter::render_document`] and
//!    [`SeriesSorter::apply_updates`] carry the changes out.
//!
//! The managed region is re-rendered as its header, one `\t<path>\n` line per
//! sorted entry, and its footer. Anything else between entries (comments,
//! guards, blank lines) is dropped, so a region holding such lines is never
//! reported as sorted.

use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::ordering::commit_order_index::CommitOrderIndex;
use crate::artifacts::ordering::error::IndexError;
use crate::artifacts::series::document::{SeriesDocument, first_word};
use crate::artifacts::series::entry::SeriesEntry;
use crate::artifacts::series::error::SeriesError;
use crate::artifacts::series::patch::{PatchFields, PatchFile};
use derive_new::new;

#[derive(Debug, new)]
pub struct SeriesSorter<'r> {
    index: &'r CommitOrderIndex,
    workspace: &'r Workspace,
    fields: &'r PatchFields,
}

impl SeriesSorter<'_> {
    /// Resolve every entry of the managed region to its upstream commit
    pub fn parse_entries(&self, document: &SeriesDocument) -> Result<Vec<SeriesEntry>, SeriesError> {
        document
            .entry_lines()
            .filter_map(|(line, text)| first_word(text).map(|name| (line, name)))
            .map(|(line, name)| self.parse_entry(line, name))
            .collect()
    }

    fn parse_entry(&self, line: usize, name: &str) -> Result<SeriesEntry, SeriesError> {
        if !self.workspace.exists(name) {
            return Err(SeriesError::PatchNotFound {
                path: name.to_string(),
            });
        }

        let content = self
            .workspace
            .read_file(name)
            .map_err(|source| SeriesError::Io {
                path: self.workspace.patch_path(name),
                source,
            })?;
        let patch = PatchFile::new(content);

        let parse_error = |reason: String| SeriesError::Parse {
            path: name.to_string(),
            line,
            reason,
        };

        let commit_field = patch
            .first_value(&self.fields.commit)
            .ok_or_else(|| parse_error(format!("no {} tag", self.fields.commit)))?;
        let commit_text = first_word(&commit_field.value).unwrap_or_default();
        if !ObjectId::is_full_hex(commit_text) {
            return Err(parse_error(format!(
                "{} tag \"{}\" is not a valid revision",
                self.fields.commit, commit_field.value
            )));
        }
        let commit = ObjectId::try_parse(commit_text.to_string())
            .map_err(|error| parse_error(error.to_string()))?;

        let recorded_tag = patch
            .first_value(&self.fields.provenance)
            .ok_or_else(|| parse_error(format!("no {} tag", self.fields.provenance)))?
            .value;

        let located = |error: IndexError| match error {
            IndexError::NotFound(commit) => SeriesError::CommitNotFound {
                path: name.to_string(),
                line,
                commit,
            },
            IndexError::NoRelease(commit) => SeriesError::NoRelease {
                path: name.to_string(),
                line,
                commit,
            },
            other => SeriesError::Index(other),
        };
        let rank = self.index.rank(&commit).map_err(located)?;
        let expected_tag = self.index.nearest_tag(&commit).map_err(located)?;

        tracing::trace!(patch = name, %commit, %rank, "resolved series entry");

        Ok(SeriesEntry {
            name: name.to_string(),
            line,
            commit,
            rank,
            recorded_tag,
            expected_tag,
        })
    }

    /// Order entries by upstream rank; entries of equal rank keep their order
    pub fn sort(entries: &[SeriesEntry]) -> Vec<SeriesEntry> {
        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|entry| entry.rank);
        sorted
    }

    /// Entries whose recorded provenance tag is stale
    pub fn compute_updates(entries: &[SeriesEntry]) -> Vec<&SeriesEntry> {
        entries.iter().filter(|entry| entry.needs_update()).collect()
    }

    /// Rewrite the provenance field of each entry to its expected tag
    ///
    /// Each patch is replaced atomically; patches rewritten before a failure
    /// stay rewritten.
    pub fn apply_updates(&self, updates: &[&SeriesEntry]) -> Result<(), SeriesError> {
        for entry in updates {
            let io_error = |source| SeriesError::Io {
                path: self.workspace.patch_path(&entry.name),
                source,
            };

            let mut patch = PatchFile::new(self.workspace.read_file(&entry.name).map_err(io_error)?);
            if !patch.set_value(&self.fields.provenance, &entry.expected_tag) {
                return Err(SeriesError::MissingField {
                    path: entry.name.clone(),
                    field: self.fields.provenance.clone(),
                });
            }

            self.workspace
                .write_file(&entry.name, patch.content())
                .map_err(io_error)?;

            tracing::info!(
                patch = %entry.name,
                from = %entry.recorded_tag,
                to = %entry.expected_tag,
                "updated {}",
                self.fields.provenance
            );
        }

        Ok(())
    }

    /// Header, one line per entry in the given order, footer
    pub fn render_managed(document: &SeriesDocument, sorted: &[SeriesEntry]) -> Vec<String> {
        document
            .header()
            .iter()
            .cloned()
            .chain(sorted.iter().map(SeriesEntry::render))
            .chain(document.footer().iter().cloned())
            .collect()
    }

    pub fn render_document(document: &SeriesDocument, sorted: &[SeriesEntry]) -> String {
        document.render_with(&Self::render_managed(document, sorted))
    }

    /// Whether the region is already sorted and every provenance tag is current
    pub fn check_sorted(
        original_managed: &[String],
        rendered_managed: &[String],
        updates: &[&SeriesEntry],
    ) -> bool {
        original_managed == rendered_managed && updates.is_empty()
    }
}
