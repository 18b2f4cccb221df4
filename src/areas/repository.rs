//! Upstream repository
//!
//! A read-only view of the git repository holding upstream history. It is the
//! on-disk [`CommitGraph`] the order index is built from.
//!
//! ## Discovery
//!
//! The git directory is taken from, in order:
//! 1. an explicit git directory (`--git-dir`, `GIT_DIR`)
//! 2. a kernel checkout (`--linux-git`, `LINUX_GIT`)
//! 3. the current directory and its parents
//!
//! Each candidate may be a work tree with a `.git` directory, a work tree with a
//! `.git` file (`gitdir: <path>`, as in linked worktrees and submodules) or a
//! bare repository. A `commondir` file in the git directory redirects objects
//! and shared refs.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::ordering::graph::{CommitGraph, TagRef};
use crate::artifacts::revision::Revision;
use crate::config::SortConfig;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Tags of tags; give up peeling past this depth
const MAX_PEEL_DEPTH: usize = 10;

pub struct Repository {
    git_dir: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
}

impl Repository {
    /// Open the git directory `git_dir` (a `.git` directory or a bare repository)
    pub fn open(git_dir: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let git_dir = git_dir
            .canonicalize()
            .with_context(|| format!("Unable to access git directory {}", git_dir.display()))?;
        let common_dir = Self::common_dir(&git_dir)?;

        let objects_path = common_dir.join("objects");
        if !objects_path.is_dir() || !git_dir.join("HEAD").is_file() {
            anyhow::bail!("Not a git repository: {}", git_dir.display());
        }

        let database = Database::new(objects_path.into_boxed_path())?;
        let refs = Refs::new(
            git_dir.clone().into_boxed_path(),
            common_dir.into_boxed_path(),
        );

        tracing::debug!(git_dir = %git_dir.display(), "opened repository");

        Ok(Repository {
            git_dir: git_dir.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            refs,
        })
    }

    /// Find the repository configured in `config` (see module docs for the order)
    pub fn from_config(
        config: &SortConfig,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        if let Some(git_dir) = &config.git_dir {
            return Self::open(git_dir, writer);
        }

        if let Some(linux_git) = &config.linux_git {
            let git_dir = Self::git_dir_at(linux_git)?.with_context(|| {
                format!("LINUX_GIT does not name a git repository: {}", linux_git.display())
            })?;
            return Self::open(&git_dir, writer);
        }

        let current_dir = std::env::current_dir()?;
        Self::discover(&current_dir, writer)
    }

    /// Search `start` and its parents for a repository
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        for dir in start.ancestors() {
            if let Some(git_dir) = Self::git_dir_at(dir)? {
                return Self::open(&git_dir, writer);
            }
        }

        anyhow::bail!(
            "Not a git repository (or any of the parent directories): {}",
            start.display()
        )
    }

    /// The git directory belonging to `path`, if `path` is a work tree or a git directory
    fn git_dir_at(path: &Path) -> anyhow::Result<Option<PathBuf>> {
        let dot_git = path.join(".git");

        if dot_git.is_dir() {
            return Ok(Some(dot_git));
        }

        if dot_git.is_file() {
            let content = std::fs::read_to_string(&dot_git)
                .with_context(|| format!("Unable to read {}", dot_git.display()))?;
            let target = content
                .trim()
                .strip_prefix("gitdir:")
                .with_context(|| format!("Invalid gitdir file {}", dot_git.display()))?
                .trim();

            return Ok(Some(path.join(target)));
        }

        if path.join("HEAD").is_file() && path.join("objects").is_dir() {
            return Ok(Some(path.to_path_buf()));
        }

        Ok(None)
    }

    fn common_dir(git_dir: &Path) -> anyhow::Result<PathBuf> {
        let commondir_path = git_dir.join("commondir");
        if !commondir_path.is_file() {
            return Ok(git_dir.to_path_buf());
        }

        let content = std::fs::read_to_string(&commondir_path)
            .with_context(|| format!("Unable to read {}", commondir_path.display()))?;

        Ok(git_dir.join(content.trim()))
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Resolve a revision expression to a commit
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        Revision::try_parse(revision)?
            .resolve(self)?
            .with_context(|| {
                format!(
                    "ambiguous argument '{}': unknown revision or path not in the working tree",
                    revision
                )
            })
    }

    /// Follow tag objects until reaching a commit
    pub fn peel_to_commit(&self, oid: &ObjectId) -> anyhow::Result<ObjectId> {
        let mut oid = oid.clone();

        for _ in 0..MAX_PEEL_DEPTH {
            match self.database.get_object_type(&oid)? {
                ObjectType::Commit => return Ok(oid),
                ObjectType::Tag => {
                    let tag = self
                        .database
                        .parse_object_as_tag(&oid)?
                        .with_context(|| format!("object {} is not a tag", oid))?;
                    oid = tag.target().clone();
                }
                object_type => anyhow::bail!(
                    "object {} is a {}, not a commit",
                    oid.to_short_oid(),
                    object_type
                ),
            }
        }

        anyhow::bail!("tag chain at {} is too deep", oid)
    }

    /// Peel a tag reference to the commit it names
    ///
    /// Returns `None` for tags of trees and blobs. The release time is the
    /// tagger time of the outermost annotated tag that has one, otherwise the
    /// author time of the commit.
    fn peel_tag(&self, name: &str, oid: &ObjectId) -> anyhow::Result<Option<TagRef>> {
        let mut oid = oid.clone();
        let mut tagger_time = None;

        for _ in 0..MAX_PEEL_DEPTH {
            let object = self.database.load(&oid)?;

            match object.object_type() {
                ObjectType::Commit => {
                    let commit = object.parse::<Commit>()?;
                    let timestamp = tagger_time.unwrap_or_else(|| commit.timestamp());
                    return Ok(Some(TagRef::new(name.to_string(), oid, timestamp)));
                }
                ObjectType::Tag => {
                    let tag = object.parse::<Tag>()?;
                    if tagger_time.is_none() {
                        tagger_time = tag.tagger().map(|tagger| tagger.timestamp());
                    }
                    oid = tag.target().clone();
                }
                ObjectType::Tree | ObjectType::Blob => return Ok(None),
            }
        }

        anyhow::bail!("tag chain at {} is too deep", oid)
    }
}

impl CommitGraph for Repository {
    fn resolve_root(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        Revision::try_parse(name)?.resolve(self)
    }

    fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self
            .database
            .parse_object_as_commit(oid)?
            .with_context(|| format!("object {} is not a commit", oid))?;

        Ok(commit.into_slim(oid.clone()))
    }

    fn tags(&self) -> anyhow::Result<Vec<TagRef>> {
        let mut tags = Vec::new();

        for named in self.refs.list_tags()? {
            match self.peel_tag(&named.name, &named.oid) {
                Ok(Some(tag)) => tags.push(tag),
                Ok(None) => tracing::trace!(tag = %named.name, "skipping tag of a non-commit"),
                Err(error) => tracing::warn!(tag = %named.name, "skipping tag: {error:#}"),
            }
        }

        Ok(tags)
    }
}
