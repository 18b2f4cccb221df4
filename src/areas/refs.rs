//! Git references (HEAD, branches, tags)
//!
//! References are read-only here: the sorter never moves a ref. A reference is
//! resolved from its loose file first and from `packed-refs` second, the same
//! precedence git uses after `git pack-refs`.
//!
//! ## File Format
//!
//! Loose references are text files containing either:
//! - A 40-character SHA-1 hash (direct reference)
//! - `ref: <path>` for symbolic references
//!
//! `packed-refs` holds one `<sha> <refname>` pair per line, preceded by an
//! optional `# pack-refs with: ...` header. Lines starting with `^` carry the
//! peeled target of the annotated tag above them.
//!
//! Linked worktrees keep `HEAD` in their own git directory while every other
//! ref lives in the common directory named by the `commondir` file.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const TAGS_PREFIX: &str = "refs/tags/";

/// Symbolic refs pointing at symbolic refs; give up past this many hops
const MAX_SYMREF_DEPTH: usize = 10;

/// A reference name with the object it points at
///
/// For annotated tags `oid` is the tag object, not the tagged commit.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct NamedRef {
    pub name: String,
    pub oid: ObjectId,
}

/// Internal representation of a reference value
#[derive(Debug, Clone)]
enum SymRefOrOid {
    /// Symbolic reference pointing to another ref
    SymRef(String),
    /// Direct object ID
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read ref file {}", path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string())))
        } else {
            Ok(Some(SymRefOrOid::Oid(
                ObjectId::try_parse(content.to_string())
                    .with_context(|| format!("Invalid ref file {}", path.display()))?,
            )))
        }
    }
}

/// Read-only view of a repository's references
#[derive(Debug, new)]
pub struct Refs {
    /// Git directory holding `HEAD`
    path: Box<Path>,
    /// Directory holding `refs/` and `packed-refs` (differs from `path` in worktrees)
    common_path: Box<Path>,
}

impl Refs {
    /// Resolve `HEAD`, following symbolic references
    ///
    /// Returns `None` for an unborn branch.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_ref(HEAD_REF_NAME)
    }

    /// Resolve a full reference name such as `refs/heads/master`
    pub fn read_ref(&self, ref_name: &str) -> anyhow::Result<Option<ObjectId>> {
        let mut ref_name = ref_name.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            match SymRefOrOid::read_symref_or_oid(&self.ref_path(&ref_name))? {
                Some(SymRefOrOid::SymRef(target)) => ref_name = target,
                Some(SymRefOrOid::Oid(oid)) => return Ok(Some(oid)),
                None => return Ok(self.read_packed_refs()?.remove(&ref_name)),
            }
        }

        anyhow::bail!("Symbolic reference {} nests too deeply", ref_name)
    }

    /// Resolve a short name the way `git rev-parse` does
    ///
    /// Tries, in order: the name itself, `refs/<name>`, `refs/tags/<name>`,
    /// `refs/heads/<name>`, `refs/remotes/<name>` and `refs/remotes/<name>/HEAD`.
    pub fn resolve_name(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let candidates = [
            name.to_string(),
            format!("refs/{name}"),
            format!("refs/tags/{name}"),
            format!("refs/heads/{name}"),
            format!("refs/remotes/{name}"),
            format!("refs/remotes/{name}/HEAD"),
        ];

        for candidate in candidates {
            if let Some(oid) = self.read_ref(&candidate)? {
                tracing::trace!(name, reference = %candidate, %oid, "resolved reference");
                return Ok(Some(oid));
            }
        }

        Ok(None)
    }

    /// List every tag as `(short name, object id)`, sorted by name
    ///
    /// A loose tag file shadows a packed entry of the same name.
    pub fn list_tags(&self) -> anyhow::Result<Vec<NamedRef>> {
        let mut tags = self
            .read_packed_refs()?
            .into_iter()
            .filter_map(|(name, oid)| {
                name.strip_prefix(TAGS_PREFIX)
                    .map(|short| (short.to_string(), oid))
            })
            .collect::<BTreeMap<_, _>>();

        let tags_path = self.common_path.join(TAGS_PREFIX);
        for entry in WalkDir::new(&tags_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let Ok(relative_path) = entry.path().strip_prefix(&tags_path) else {
                continue;
            };
            let name = relative_path
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            match SymRefOrOid::read_symref_or_oid(entry.path()) {
                Ok(Some(SymRefOrOid::Oid(oid))) => {
                    tags.insert(name, oid);
                }
                Ok(Some(SymRefOrOid::SymRef(target))) => {
                    if let Some(oid) = self.read_ref(&target)? {
                        tags.insert(name, oid);
                    }
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(tag = %name, "skipping unreadable tag: {error:#}"),
            }
        }

        Ok(tags
            .into_iter()
            .map(|(name, oid)| NamedRef::new(name, oid))
            .collect())
    }

    fn read_packed_refs(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let packed_refs_path = self.common_path.join("packed-refs");
        if !packed_refs_path.is_file() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&packed_refs_path)
            .with_context(|| format!("Unable to read {}", packed_refs_path.display()))?;

        content
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('^'))
            .map(|line| {
                let (oid, name) = line
                    .split_once(' ')
                    .with_context(|| format!("Invalid packed-refs line: {line}"))?;
                Ok((name.trim().to_string(), ObjectId::try_parse(oid.to_string())?))
            })
            .collect()
    }

    fn ref_path(&self, ref_name: &str) -> Box<Path> {
        // per-worktree refs live next to HEAD, shared refs in the common directory
        let base = if ref_name.starts_with("refs/") {
            &self.common_path
        } else {
            &self.path
        };

        base.join(ref_name).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }
}
