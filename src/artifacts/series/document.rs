//! Series document splitting
//!
//! A series file is split into the lines before the managed region, the managed
//! region itself and the lines after it. Blank lines and comment lines are
//! buffered in runs and attached to a region as a block, so the comment block
//! holding the start marker opens the managed region and the comment block
//! holding the end marker closes it from the outside:
//!
//! ```text
//! patches.arch/x86-fix.patch          <- before
//!
//!     ########################        <- managed (whole comment block)
//!     # sorted patches
//!     ########################
//!     patches.suse/a.patch
//!     patches.suse/b.patch
//!
//!     ########################        <- after (whole comment block)
//!     # end of sorted patches
//!     ########################
//! ```
//!
//! Lines keep their terminators so that rendering is byte-faithful.

use crate::artifacts::series::error::SeriesError;

pub const START_MARKER: &str = "# sorted patches";
pub const END_MARKER: &str = "# end of sorted patches";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Managed,
    After,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesDocument {
    pub before: Vec<String>,
    pub managed: Vec<String>,
    pub after: Vec<String>,
}

/// Lines naming a patch: not blank, not a comment, not a `-`/`+` guard
pub fn is_entry_line(line: &str) -> bool {
    let line = line.trim();
    !(line.is_empty() || line.starts_with(['#', '-', '+']))
}

pub fn first_word(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

impl SeriesDocument {
    /// Split `text` around its managed region
    pub fn split(text: &str) -> Result<Self, SeriesError> {
        let mut document = SeriesDocument::default();
        let mut region = Region::Before;
        let mut blanks = Vec::new();
        let mut comments = Vec::new();

        for line in split_lines(text) {
            let stripped = line.trim();

            if stripped.is_empty() {
                document.region_mut(region).append(&mut comments);
                blanks.push(line);
            } else if stripped.starts_with('#') {
                document.region_mut(region).append(&mut blanks);

                let lowered = stripped.to_lowercase();
                if region == Region::Before && lowered == START_MARKER {
                    region = Region::Managed;
                } else if region == Region::Managed && lowered == END_MARKER {
                    region = Region::After;
                }
                comments.push(line);
            } else {
                let current = document.region_mut(region);
                current.append(&mut comments);
                current.append(&mut blanks);
                current.push(line);
            }
        }

        if region == Region::Before {
            return Err(SeriesError::NoManagedRegion);
        }

        let current = document.region_mut(region);
        current.append(&mut comments);
        current.append(&mut blanks);

        Ok(document)
    }

    /// A document whose every line is managed, for input without markers
    pub fn whole(text: &str) -> Self {
        SeriesDocument {
            managed: split_lines(text),
            ..Default::default()
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut Vec<String> {
        match region {
            Region::Before => &mut self.before,
            Region::Managed => &mut self.managed,
            Region::After => &mut self.after,
        }
    }

    /// Managed lines preceding the first entry
    pub fn header(&self) -> &[String] {
        let end = self
            .managed
            .iter()
            .position(|line| is_entry_line(line))
            .unwrap_or(self.managed.len());

        &self.managed[..end]
    }

    /// Managed lines following the last entry; empty when there is no entry
    pub fn footer(&self) -> &[String] {
        match self.managed.iter().rposition(|line| is_entry_line(line)) {
            Some(last) => &self.managed[last + 1..],
            None => &[],
        }
    }

    /// Entry lines of the managed region with their 1-based document line number
    pub fn entry_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        let offset = self.before.len() + 1;

        self.managed
            .iter()
            .enumerate()
            .filter(|(_, line)| is_entry_line(line))
            .map(move |(i, line)| (offset + i, line.as_str()))
    }

    /// Render the document with `managed` in place of the managed region
    pub fn render_with(&self, managed: &[String]) -> String {
        self.before
            .iter()
            .chain(managed)
            .chain(&self.after)
            .map(String::as_str)
            .collect()
    }

    pub fn render(&self) -> String {
        self.render_with(&self.managed)
    }
}
