use crate::areas::repository::Repository;
use crate::areas::workspace::{Workspace, write_atomic};
use crate::artifacts::series::document::SeriesDocument;
use crate::artifacts::series::error::SeriesError;
use crate::artifacts::series::sorter::SeriesSorter;
use crate::config::SortConfig;
use anyhow::Context;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct SeriesOptions {
    /// Report instead of rewriting
    pub check: bool,
    /// Directory patch paths are relative to
    pub prefix: Option<PathBuf>,
    /// Series file rewritten in place; standard input and output when absent
    pub series: Option<PathBuf>,
}

impl SeriesOptions {
    fn patch_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(prefix) = &self.prefix {
            return Ok(prefix.clone());
        }

        match self.series.as_deref().and_then(Path::parent) {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
            Some(_) => Ok(PathBuf::from(".")),
            None => std::env::current_dir().context("Unable to determine the current directory"),
        }
    }
}

/// Outcome of a check-only run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Sorting would change the managed region
    pub unsorted: bool,
    /// Some provenance tags differ from the nearest release
    pub outdated: bool,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        !self.unsorted && !self.outdated
    }
}

impl Repository {
    /// Sort the managed region of a series and refresh provenance tags
    ///
    /// Every patch is read and resolved before anything is written. The series
    /// is written before the patches; a failing patch rewrite leaves earlier
    /// rewrites in place.
    pub fn series(
        &self,
        opts: &SeriesOptions,
        config: &SortConfig,
        stdin: &mut dyn Read,
    ) -> anyhow::Result<CheckReport> {
        let text = match &opts.series {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Unable to read series file {}", path.display()))?,
            None => {
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .context("Unable to read series from standard input")?;
                text
            }
        };

        let document = match SeriesDocument::split(&text) {
            Ok(document) => document,
            Err(SeriesError::NoManagedRegion) if opts.series.is_none() => {
                SeriesDocument::whole(&text)
            }
            Err(SeriesError::NoManagedRegion) if opts.check => {
                tracing::debug!("no sorted section, nothing to check");
                return Ok(CheckReport::default());
            }
            Err(error) => return Err(error.into()),
        };

        let workspace = Workspace::new(opts.patch_dir()?.into_boxed_path());
        let index = self.build_index(config)?;
        let sorter = SeriesSorter::new(&index, &workspace, &config.fields);

        let entries = sorter.parse_entries(&document)?;
        let sorted = SeriesSorter::sort(&entries);
        let managed = SeriesSorter::render_managed(&document, &sorted);
        let updates = SeriesSorter::compute_updates(&entries);

        tracing::debug!(
            entries = entries.len(),
            updates = updates.len(),
            "resolved sorted section"
        );

        if opts.check {
            if SeriesSorter::check_sorted(&document.managed, &managed, &updates) {
                return Ok(CheckReport::default());
            }

            let report = CheckReport {
                unsorted: document.managed != managed,
                outdated: !updates.is_empty(),
            };
            if report.unsorted {
                writeln!(self.writer(), "Input is not sorted.")?;
            }
            if report.outdated {
                writeln!(self.writer(), "{} tags are outdated.", config.fields.provenance)?;
            }

            return Ok(report);
        }

        let output = document.render_with(&managed);
        match &opts.series {
            Some(path) => write_atomic(path, output.as_bytes())
                .with_context(|| format!("Unable to write series file {}", path.display()))?,
            None => write!(self.writer(), "{output}")?,
        }

        sorter.apply_updates(&updates)?;

        Ok(CheckReport::default())
    }
}
