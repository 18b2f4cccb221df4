//! Pack file reader
//!
//! Upstream kernel clones keep almost all of their history in pack files, so the
//! object database must read them alongside loose objects. Only reading is
//! supported: version 2 indexes (`.idx`) and version 2/3 packs (`.pack`).
//!
//! ## Index layout (`.idx` v2)
//!
//! ```text
//! \377tOc | version=2 | fanout[256] u32 | names[N] 20 bytes | crc32[N] u32
//!         | offsets[N] u32 (MSB set -> index into large offsets) | large[M] u64
//! ```
//!
//! ## Entry layout (`.pack`)
//!
//! A variable-length header (type in bits 4-6 of the first byte, size spread over
//! the low bits of every byte), then for `OFS_DELTA` a backwards offset to the base
//! entry and for `REF_DELTA` the base object id, then a zlib stream.
//!
//! Delta entries are resolved recursively and applied with [`apply_delta`].

use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::RawObject;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

const IDX_MAGIC: [u8; 4] = [0xff, b't', b'O', b'c'];
const PACK_MAGIC: &[u8; 4] = b"PACK";
const LARGE_OFFSET_FLAG: u32 = 0x8000_0000;
const OFS_DELTA: u8 = 6;
const REF_DELTA: u8 = 7;

type RawId = [u8; RAW_OBJECT_ID_LENGTH];

/// In-memory view of a `.idx` file
#[derive(Debug)]
pub struct PackIndex {
    fanout: [u32; 256],
    names: Vec<RawId>,
    offsets: Vec<u64>,
}

impl PackIndex {
    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        let mut reader = Cursor::new(data);

        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        if magic != IDX_MAGIC {
            anyhow::bail!("Unsupported pack index format (only version 2 is supported)");
        }
        let version = reader.read_u32::<BigEndian>()?;
        if version != 2 {
            anyhow::bail!("Unsupported pack index version {}", version);
        }

        let mut fanout = [0u32; 256];
        reader.read_u32_into::<BigEndian>(&mut fanout)?;
        let count = fanout[255] as usize;

        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            let mut raw = [0; RAW_OBJECT_ID_LENGTH];
            reader.read_exact(&mut raw)?;
            names.push(raw);
        }

        // skip the crc32 table
        reader.seek(SeekFrom::Current(4 * count as i64))?;

        let mut small_offsets = vec![0u32; count];
        reader.read_u32_into::<BigEndian>(&mut small_offsets)?;

        let large_count = small_offsets
            .iter()
            .filter(|offset| *offset & LARGE_OFFSET_FLAG != 0)
            .count();
        let mut large_offsets = vec![0u64; large_count];
        reader.read_u64_into::<BigEndian>(&mut large_offsets)?;

        let offsets = small_offsets
            .into_iter()
            .map(|offset| {
                if offset & LARGE_OFFSET_FLAG != 0 {
                    large_offsets
                        .get((offset & !LARGE_OFFSET_FLAG) as usize)
                        .copied()
                        .context("Pack index large offset out of range")
                } else {
                    Ok(offset as u64)
                }
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(PackIndex {
            fanout,
            names,
            offsets,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn offset_of(&self, raw: &RawId) -> Option<u64> {
        let first = raw[0] as usize;
        let lo = if first == 0 {
            0
        } else {
            self.fanout[first - 1] as usize
        };
        let hi = self.fanout[first] as usize;

        self.names
            .get(lo..hi)?
            .binary_search(raw)
            .ok()
            .map(|position| self.offsets[lo + position])
    }

    pub fn oids_with_prefix(&self, prefix: &str) -> Vec<ObjectId> {
        self.names
            .iter()
            .map(ObjectId::from_raw)
            .filter(|oid| oid.as_ref().starts_with(prefix))
            .collect()
    }
}

/// A pack file together with its index
#[derive(Debug)]
pub struct Pack {
    path: Box<Path>,
    index: PackIndex,
    file: File,
}

impl Pack {
    /// Open the pack belonging to the given `.idx` file
    pub fn open(idx_path: &Path) -> anyhow::Result<Self> {
        let pack_path = idx_path.with_extension("pack");

        let index_content = std::fs::read(idx_path)
            .with_context(|| format!("Unable to read pack index {}", idx_path.display()))?;
        let index = PackIndex::parse(&index_content)
            .with_context(|| format!("Invalid pack index {}", idx_path.display()))?;

        let mut file = File::open(&pack_path)
            .with_context(|| format!("Unable to open pack file {}", pack_path.display()))?;
        let mut magic = [0; 4];
        file.read_exact(&mut magic)?;
        let version = file.read_u32::<BigEndian>()?;
        if &magic != PACK_MAGIC || !(2..=3).contains(&version) {
            anyhow::bail!("Invalid pack file {}", pack_path.display());
        }

        Ok(Pack {
            path: pack_path.into_boxed_path(),
            index,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        oid.to_raw()
            .map(|raw| self.index.offset_of(&raw).is_some())
            .unwrap_or(false)
    }

    /// Read an object from this pack
    ///
    /// `resolve_base` loads `REF_DELTA` bases that live outside this pack.
    pub fn read_object<F>(
        &self,
        oid: &ObjectId,
        resolve_base: &F,
    ) -> anyhow::Result<Option<RawObject>>
    where
        F: Fn(&ObjectId) -> anyhow::Result<RawObject>,
    {
        let Some(offset) = self.index.offset_of(&oid.to_raw()?) else {
            return Ok(None);
        };

        self.read_at(offset, resolve_base)
            .with_context(|| format!("Unable to read object {} from {}", oid, self.path.display()))
            .map(Some)
    }

    fn read_at<F>(&self, offset: u64, resolve_base: &F) -> anyhow::Result<RawObject>
    where
        F: Fn(&ObjectId) -> anyhow::Result<RawObject>,
    {
        let mut handle = &self.file;
        handle.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(handle);

        let (code, size) = read_entry_header(&mut reader)?;

        match code {
            OFS_DELTA => {
                let distance = read_base_distance(&mut reader)?;
                let delta = inflate(&mut reader, size)?;
                let base_offset = offset
                    .checked_sub(distance)
                    .context("OFS_DELTA base lies before the start of the pack")?;
                let base = self.read_at(base_offset, resolve_base)?;

                Ok(RawObject::new(
                    base.object_type(),
                    apply_delta(base.data(), &delta)?.into(),
                ))
            }
            REF_DELTA => {
                let base_oid = ObjectId::read_h40_from(&mut reader)?;
                let delta = inflate(&mut reader, size)?;
                let base = match self.index.offset_of(&base_oid.to_raw()?) {
                    Some(base_offset) => self.read_at(base_offset, resolve_base)?,
                    None => resolve_base(&base_oid)?,
                };

                Ok(RawObject::new(
                    base.object_type(),
                    apply_delta(base.data(), &delta)?.into(),
                ))
            }
            code => {
                let object_type = ObjectType::from_pack_code(code)
                    .with_context(|| format!("Invalid pack entry type {}", code))?;
                Ok(RawObject::new(object_type, inflate(&mut reader, size)?.into()))
            }
        }
    }
}

fn read_entry_header(reader: &mut impl Read) -> anyhow::Result<(u8, usize)> {
    let mut byte = reader.read_u8()?;
    let code = (byte >> 4) & 0x07;
    let mut size = (byte & 0x0f) as usize;
    let mut shift = 4;

    while byte & 0x80 != 0 {
        if shift > usize::BITS - 7 {
            anyhow::bail!("Pack entry size overflows");
        }
        byte = reader.read_u8()?;
        size |= ((byte & 0x7f) as usize) << shift;
        shift += 7;
    }

    Ok((code, size))
}

/// Decode the big-endian, offset-biased distance of an `OFS_DELTA` base
fn read_base_distance(reader: &mut impl Read) -> anyhow::Result<u64> {
    let mut byte = reader.read_u8()?;
    let mut distance = (byte & 0x7f) as u64;

    while byte & 0x80 != 0 {
        byte = reader.read_u8()?;
        distance = ((distance + 1) << 7) | (byte & 0x7f) as u64;
    }

    Ok(distance)
}

fn inflate(reader: impl Read, size: usize) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(size);
    ZlibDecoder::new(reader)
        .read_to_end(&mut data)
        .context("Unable to decompress pack entry")?;

    if data.len() != size {
        anyhow::bail!(
            "Pack entry inflated to {} bytes, expected {}",
            data.len(),
            size
        );
    }

    Ok(data)
}

fn read_delta_size(reader: &mut impl Read) -> anyhow::Result<usize> {
    let mut size = 0usize;
    let mut shift = 0;

    loop {
        if shift > usize::BITS - 7 {
            anyhow::bail!("Delta size overflows");
        }
        let byte = reader.read_u8()?;
        size |= ((byte & 0x7f) as usize) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok(size);
        }
    }
}

/// Apply a git delta to its base
///
/// A delta starts with the base and result sizes, followed by copy instructions
/// (high bit set; bits 0-3 select offset bytes, bits 4-6 select size bytes) and
/// insert instructions (high bit clear; the opcode is the literal length).
pub fn apply_delta(base: &[u8], delta: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut reader = Cursor::new(delta);

    let base_size = read_delta_size(&mut reader)?;
    if base_size != base.len() {
        anyhow::bail!(
            "Delta expects a base of {} bytes, found {}",
            base_size,
            base.len()
        );
    }
    let result_size = read_delta_size(&mut reader)?;
    let mut result = Vec::with_capacity(result_size);

    while (reader.position() as usize) < delta.len() {
        let opcode = reader.read_u8()?;

        if opcode & 0x80 != 0 {
            let mut offset = 0usize;
            let mut size = 0usize;
            for i in 0..4 {
                if opcode & (1 << i) != 0 {
                    offset |= (reader.read_u8()? as usize) << (8 * i);
                }
            }
            for i in 0..3 {
                if opcode & (0x10 << i) != 0 {
                    size |= (reader.read_u8()? as usize) << (8 * i);
                }
            }
            if size == 0 {
                size = 0x10000;
            }

            let end = offset
                .checked_add(size)
                .context("Delta copy range overflows")?;
            let chunk = base
                .get(offset..end)
                .context("Delta copy range lies outside the base object")?;
            result.extend_from_slice(chunk);
        } else if opcode != 0 {
            let mut literal = vec![0; opcode as usize];
            reader.read_exact(&mut literal)?;
            result.extend_from_slice(&literal);
        } else {
            anyhow::bail!("Reserved delta opcode 0");
        }
    }

    if result.len() != result_size {
        anyhow::bail!(
            "Delta produced {} bytes, expected {}",
            result.len(),
            result_size
        );
    }

    Ok(result)
}
