//! Git commit object
//!
//! Commits are the nodes of the upstream history graph. The ordering index only
//! needs a commit's parents and its author time, but the full header is parsed so
//! that malformed objects are reported instead of silently misordered.
//!
//! ## Format
//!
//! Content (after the `commit <size>\0` header):
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>        (zero or more)
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//! [other headers, e.g. gpgsig, mergetag, with continuation lines]
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::BufRead;

/// Author, committer or tagger information
///
/// Contains name, email, and timestamp with timezone information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Format author name and email for display
    ///
    /// # Returns
    ///
    /// String in format "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Get the timestamp
    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name_email_part = parts[2]; // "name <email>"

        // Extract email from within angle brackets
        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .rfind('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;
        if email_end <= email_start {
            return Err(anyhow::anyhow!("Invalid author format: '>' before '<'"));
        }

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let offset = chrono::DateTime::parse_from_str(
            &format!("1970-01-01 00:00:00 {}", timezone),
            "%Y-%m-%d %H:%M:%S %z",
        )
        .map_err(|_| anyhow::anyhow!("Invalid timezone {}", timezone))?
        .offset()
        .to_owned();
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Slim representation of a commit
///
/// Contains only what the ordering index needs: identity, parent edges and the
/// author time used as a tie-break between unrelated commits.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// The commit's parent object IDs
    pub parents: Vec<ObjectId>,
    /// Author timestamp
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl PartialOrd for SlimCommit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlimCommit {
    /// Older first; equal times fall back to the object id so no two commits tie
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.oid.cmp(&other.oid))
    }
}

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for root commits, multiple for merge commits)
    parents: Vec<ObjectId>,
    /// Tree object ID representing the directory snapshot
    tree_oid: ObjectId,
    /// Author who wrote the changes
    author: Author,
    /// Committer who recorded the commit
    committer: Author,
    /// Commit message
    message: String,
}

impl Commit {
    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    pub fn into_slim(self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            timestamp: self.timestamp(),
            oid,
            parents: self.parents,
        }
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        // commit messages may carry a legacy encoding; headers are always ASCII
        let content = String::from_utf8_lossy(&content);
        let mut lines = content.split('\n');

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            // continuation of a multi-line header (gpgsig, mergetag)
            if line.starts_with(' ') {
                continue;
            }

            let (key, value) = line.split_once(' ').unwrap_or((line, ""));
            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" => parents.push(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                _ => {}
            }
        }

        let tree_oid = tree_oid.context("Invalid commit object: missing tree line")?;
        let author = author.context("Invalid commit object: missing author line")?;
        let committer = committer.context("Invalid commit object: missing committer line")?;
        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        })
    }
}
