//! Patch file header
//!
//! Backport patches carry their provenance as `Name: value` lines in the header,
//! before the diff:
//!
//! ```text
//! From: Jane Developer <jane@example.com>
//! Date: Mon, 9 Jan 2017 10:00:00 +0100
//! Subject: net: fix a leak
//! Git-commit: 0123456789abcdef0123456789abcdef01234567
//! Patch-mainline: v4.10-rc4
//! References: bsc#1012345
//!
//! ---
//!  net/core/dev.c | 2 +-
//! ```
//!
//! The header ends at the first line starting with `---`, `diff --git` or
//! `Index:`. Field names match ASCII case-insensitively. Content is kept as
//! bytes: only the value of a rewritten field changes, every other byte
//! (including CRLF terminators and non-UTF-8 hunks) is preserved.

const BODY_MARKERS: [&[u8]; 3] = [b"---", b"diff --git", b"Index:"];

/// Names of the header fields the sorter reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFields {
    /// Upstream commit the patch backports
    pub commit: String,
    /// Nearest upstream release containing that commit
    pub provenance: String,
}

impl Default for PatchFields {
    fn default() -> Self {
        PatchFields {
            commit: "Git-commit".to_string(),
            provenance: "Patch-mainline".to_string(),
        }
    }
}

/// A header field occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// 1-based line number in the patch
    pub line: usize,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct PatchFile {
    content: Vec<u8>,
}

struct HeaderLine<'p> {
    start: usize,
    bytes: &'p [u8],
}

impl PatchFile {
    pub fn new(content: Vec<u8>) -> Self {
        PatchFile { content }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    fn header_lines(&self) -> impl Iterator<Item = HeaderLine<'_>> {
        let mut start = 0;

        self.content
            .split_inclusive(|byte| *byte == b'\n')
            .map(move |bytes| {
                let line = HeaderLine { start, bytes };
                start += bytes.len();
                line
            })
            .take_while(|line| {
                !BODY_MARKERS
                    .iter()
                    .any(|marker| line.bytes.starts_with(marker))
            })
    }

    /// Every value of header field `name`, in order
    pub fn values(&self, name: &str) -> Vec<HeaderField> {
        self.header_lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let colon = field_colon(line.bytes, name)?;
                let value = String::from_utf8_lossy(&line.bytes[colon + 1..])
                    .trim()
                    .to_string();

                Some(HeaderField { line: i + 1, value })
            })
            .collect()
    }

    pub fn first_value(&self, name: &str) -> Option<HeaderField> {
        self.values(name).into_iter().next()
    }

    /// Replace the value of the first `name` field
    ///
    /// The field name spelling, the whitespace after the colon (one space if
    /// there was none) and the line terminator are kept. Returns `false` when
    /// the header has no such field.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        let Some((start, bytes_len, colon)) = self.header_lines().find_map(|line| {
            field_colon(line.bytes, name).map(|colon| (line.start, line.bytes.len(), colon))
        }) else {
            return false;
        };

        let line = &self.content[start..start + bytes_len];
        let rest = &line[colon + 1..];

        let spacing_len = rest
            .iter()
            .take_while(|byte| **byte == b' ' || **byte == b'\t')
            .count();
        let terminator_len = if rest.ends_with(b"\r\n") {
            2
        } else if rest.ends_with(b"\n") {
            1
        } else {
            0
        };

        let mut replacement = line[..=colon].to_vec();
        if spacing_len == 0 {
            replacement.push(b' ');
        } else {
            replacement.extend_from_slice(&rest[..spacing_len]);
        }
        replacement.extend_from_slice(value.as_bytes());
        replacement.extend_from_slice(&rest[rest.len() - terminator_len..]);

        let mut content = Vec::with_capacity(self.content.len() + value.len());
        content.extend_from_slice(&self.content[..start]);
        content.extend_from_slice(&replacement);
        content.extend_from_slice(&self.content[start + bytes_len..]);
        self.content = content;

        true
    }
}

/// Position of the colon if `line` is a `name:` header line
fn field_colon(line: &[u8], name: &str) -> Option<usize> {
    let colon = line.iter().position(|byte| *byte == b':')?;

    line[..colon]
        .eq_ignore_ascii_case(name.as_bytes())
        .then_some(colon)
}
