use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{BufRead, Cursor};

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// An object as stored, before interpretation: its type and content bytes
///
/// Loose objects and pack entries both decode to this shape; delta entries are
/// resolved against their base before a `RawObject` is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    object_type: ObjectType,
    data: Bytes,
}

impl RawObject {
    pub fn new(object_type: ObjectType, data: Bytes) -> Self {
        RawObject { object_type, data }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn reader(&self) -> impl BufRead + '_ {
        Cursor::new(self.data.as_ref())
    }

    /// Hash the object the way git names it: `<type> <size>\0<content>`
    pub fn object_id(&self) -> Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", self.object_type, self.data.len()).as_bytes());
        hasher.update(&self.data);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }

    pub fn parse<T: Unpackable>(&self) -> Result<T> {
        T::deserialize(self.reader())
    }
}
