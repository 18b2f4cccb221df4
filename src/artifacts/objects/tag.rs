//! Annotated tag object
//!
//! Release tags in upstream kernel trees are annotated: the ref under `refs/tags/`
//! names a tag object which in turn names the tagged commit. Lightweight tags point
//! at the commit directly and never reach this parser.
//!
//! ## Format
//!
//! ```text
//! object <sha>
//! type commit
//! tag <name>
//! tagger <name> <email> <timestamp> <timezone>   (absent on very old tags)
//!
//! <message, optionally followed by a signature>
//! ```

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::BufRead;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    target: ObjectId,
    target_type: ObjectType,
    name: String,
    tagger: Option<Author>,
}

impl Tag {
    pub fn target(&self) -> &ObjectId {
        &self.target
    }

    pub fn target_type(&self) -> ObjectType {
        self.target_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tagger(&self) -> Option<&Author> {
        self.tagger.as_ref()
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut target = None;
        let mut target_type = None;
        let mut name = None;
        let mut tagger = None;

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                break;
            }

            let (key, value) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            match key {
                "object" => target = Some(ObjectId::try_parse(value.to_string())?),
                "type" => target_type = Some(ObjectType::try_from(value)?),
                "tag" => name = Some(value.to_string()),
                "tagger" => tagger = Some(Author::try_from(value)?),
                _ => {}
            }
        }

        Ok(Tag {
            target: target.context("Invalid tag object: missing object line")?,
            target_type: target_type.context("Invalid tag object: missing type line")?,
            name: name.context("Invalid tag object: missing tag line")?,
            tagger,
        })
    }
}
