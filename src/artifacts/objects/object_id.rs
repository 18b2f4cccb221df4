//! Git object identifier (SHA-1 hash)
//!
//! Object IDs are 40-character hexadecimal strings representing SHA-1 hashes.
//! They uniquely identify all objects in Git (blobs, trees, commits, tags).
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 12 characters, the abbreviation kernel patch tooling prints
//! - Raw: 20 bytes, as stored in pack indexes and `REF_DELTA` entries
//!
//! ## Storage
//!
//! Loose objects are stored in `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_LENGTH, RAW_OBJECT_ID_LENGTH};
use std::io;
use std::path::PathBuf;

/// Git object identifier (SHA-1 hash)
///
/// A 40-character lowercase hexadecimal string that uniquely identifies an object.
/// The derived ordering is the lexicographic order of the hex digits, which is the
/// final tie-break of the commit order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase hex digits are accepted and normalized to lowercase so that ids
    /// copied from patch headers compare equal to ids read from the repository.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Whether `candidate` looks like a full object id (40 hex digits)
    pub fn is_full_hex(candidate: &str) -> bool {
        candidate.len() == OBJECT_ID_LENGTH && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Read an object ID from binary format (20 bytes)
    ///
    /// Reads 20 bytes and converts to a 40-character hex string.
    /// Used when reading pack index tables and `REF_DELTA` base references.
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0; RAW_OBJECT_ID_LENGTH];
        reader.read_exact(&mut raw)?;

        Ok(Self::from_raw(&raw))
    }

    pub fn from_raw(raw: &[u8; RAW_OBJECT_ID_LENGTH]) -> Self {
        let mut hex40 = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex40.push_str(&format!("{:02x}", byte));
        }

        Self(hex40)
    }

    /// Convert to the 20-byte binary form
    pub fn to_raw(&self) -> anyhow::Result<[u8; RAW_OBJECT_ID_LENGTH]> {
        let mut raw = [0; RAW_OBJECT_ID_LENGTH];

        // Process a nibble pair at a time
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&self.0[i * 2..i * 2 + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid hex digit"))?;
        }

        Ok(raw)
    }

    /// Convert to file system path for loose object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    /// For example, `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Get abbreviated form of the object ID (first 12 characters)
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(12).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
