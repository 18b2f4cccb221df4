//! Read-only object database
//!
//! Objects are looked up as loose files under `objects/XX/YYYY...` first and then
//! in every pack under `objects/pack/`. Repositories borrowing objects through
//! `objects/info/alternates` (e.g. clones made with `--reference`) are followed
//! as well.

use crate::areas::pack::Pack;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::RawObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use anyhow::Context;
use bytes::Bytes;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Alternates may chain; stop following them past this depth
const MAX_ALTERNATE_DEPTH: usize = 5;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    packs: Vec<Pack>,
    alternates: Vec<Database>,
}

impl Database {
    pub fn new(path: Box<Path>) -> anyhow::Result<Self> {
        Self::open_with_depth(path, 0)
    }

    fn open_with_depth(path: Box<Path>, depth: usize) -> anyhow::Result<Self> {
        let packs = Self::open_packs(&path)?;
        let alternates = if depth < MAX_ALTERNATE_DEPTH {
            Self::read_alternates(&path)?
                .into_iter()
                .map(|alternate| Self::open_with_depth(alternate.into_boxed_path(), depth + 1))
                .collect::<anyhow::Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        tracing::debug!(
            objects = %path.display(),
            packs = packs.len(),
            alternates = alternates.len(),
            "opened object database"
        );

        Ok(Database {
            path,
            packs,
            alternates,
        })
    }

    fn open_packs(path: &Path) -> anyhow::Result<Vec<Pack>> {
        let pack_dir = path.join("pack");
        if !pack_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut idx_paths = std::fs::read_dir(&pack_dir)
            .with_context(|| format!("Unable to list pack directory {}", pack_dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "idx"))
            .collect::<Vec<_>>();
        idx_paths.sort();

        idx_paths
            .iter()
            .map(|idx_path| Pack::open(idx_path))
            .collect()
    }

    fn read_alternates(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let alternates_path = path.join("info").join("alternates");
        if !alternates_path.is_file() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&alternates_path)
            .with_context(|| format!("Unable to read {}", alternates_path.display()))?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| path.join(line))
            .filter(|alternate| alternate.is_dir())
            .collect())
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Load an object and verify that its content hashes to `object_id`
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<RawObject> {
        let object = self
            .find(object_id)?
            .with_context(|| format!("Object {} not found", object_id))?;

        let actual = object.object_id()?;
        if &actual != object_id {
            anyhow::bail!("Object {} is corrupt (content hashes to {})", object_id, actual);
        }

        Ok(object)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
            || self.packs.iter().any(|pack| pack.contains(object_id))
            || self
                .alternates
                .iter()
                .any(|alternate| alternate.contains(object_id))
    }

    fn find(&self, object_id: &ObjectId) -> anyhow::Result<Option<RawObject>> {
        let object_path = self.path.join(object_id.to_path());
        if object_path.is_file() {
            return self.read_loose(&object_path).map(Some);
        }

        let resolve_base = |base: &ObjectId| self.load(base);
        for pack in &self.packs {
            if let Some(object) = pack.read_object(object_id, &resolve_base)? {
                return Ok(Some(object));
            }
        }

        for alternate in &self.alternates {
            if let Some(object) = alternate.find(object_id)? {
                return Ok(Some(object));
            }
        }

        Ok(None)
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let object = self.load(object_id)?;

        match object.object_type() {
            ObjectType::Commit => Ok(Some(
                object
                    .parse::<Commit>()
                    .with_context(|| format!("Invalid commit {}", object_id))?,
            )),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tag(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tag>> {
        let object = self.load(object_id)?;

        match object.object_type() {
            ObjectType::Tag => Ok(Some(
                object
                    .parse::<Tag>()
                    .with_context(|| format!("Invalid tag object {}", object_id))?,
            )),
            _ => Ok(None),
        }
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        Ok(self.load(object_id)?.object_type())
    }

    /// Find all objects whose OID starts with the given prefix
    ///
    /// Searches loose objects, pack indexes and alternates. The result is sorted
    /// and deduplicated; more than one match means the prefix is ambiguous.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matches = self.find_loose_by_prefix(&prefix)?;

        for pack in &self.packs {
            matches.extend(pack.index().oids_with_prefix(&prefix));
        }
        for alternate in &self.alternates {
            matches.extend(alternate.find_objects_by_prefix(&prefix)?);
        }

        matches.sort();
        matches.dedup();

        Ok(matches)
    }

    fn find_loose_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let dir_names = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255).map(|i| format!("{:02x}", i)).collect()
        };

        let mut matches = Vec::new();
        for dir_name in dir_names {
            let dir_path = self.path.join(&dir_name);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path)? {
                let full_oid = format!("{}{}", dir_name, entry?.file_name().to_string_lossy());
                if full_oid.starts_with(prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        Ok(matches)
    }

    fn read_loose(&self, object_path: &Path) -> anyhow::Result<RawObject> {
        let compressed = std::fs::read(object_path)
            .with_context(|| format!("Unable to read object file {}", object_path.display()))?;

        let mut content = Vec::new();
        flate2::read::ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut content)
            .with_context(|| format!("Unable to decompress {}", object_path.display()))?;

        let mut reader = Cursor::new(content);
        let (object_type, size) = ObjectType::parse_object_header(&mut reader)?;
        let header_len = reader.position() as usize;
        let content = Bytes::from(reader.into_inner()).slice(header_len..);

        if content.len() != size {
            anyhow::bail!(
                "Object file {} declares {} bytes but holds {}",
                object_path.display(),
                size,
                content.len()
            );
        }

        Ok(RawObject::new(object_type, content))
    }
}
