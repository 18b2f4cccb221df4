use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;

/// Characters and sequences git forbids in reference names
pub const INVALID_REF_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";

/// Minimum length of an abbreviated object id
const MIN_ABBREV_LENGTH: usize = 4;

/// A revision naming an upstream commit
///
/// Supports:
/// - Reference names: `HEAD`, `master`, `v4.9`, `origin/master`
/// - The alias `@` for `HEAD`
/// - Full and abbreviated (4+ hex digits) object ids
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>`
///
/// Reference names win over object ids when a string could be either, and
/// tags are peeled to the commit they name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// A reference name or an object id, told apart during resolution
    Ref(String),
    /// The Nth first-parent ancestor of a revision
    Ancestor(Box<Revision>, usize),
    /// The first parent of a revision
    Parent(Box<Revision>),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_regex.captures(revision) {
            Ok(Revision::Parent(Box::new(Self::try_parse(&caps[1])?)))
        } else if let Some(caps) = ancestor_regex.captures(revision) {
            let generations: usize = caps[2]
                .parse()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;

            Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&caps[1])?),
                generations,
            ))
        } else {
            let name = if revision == "@" { "HEAD" } else { revision };

            if name.is_empty()
                || regex::Regex::new(INVALID_REF_NAME_REGEX)?.is_match(name)
            {
                anyhow::bail!("invalid revision: '{}'", revision);
            }

            Ok(Revision::Ref(name.to_string()))
        }
    }

    /// Resolve to a commit; `None` when nothing carries the name
    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        match self {
            Revision::Ref(name) => {
                if let Some(oid) = repository.refs().resolve_name(name)? {
                    return repository.peel_to_commit(&oid).map(Some);
                }

                if Self::looks_like_oid(name) {
                    Self::resolve_oid(name, repository)
                } else {
                    Ok(None)
                }
            }
            Revision::Parent(base_revision) => base_revision
                .resolve(repository)?
                .map(|oid| Self::resolve_commit_parent(&oid, repository))
                .transpose(),
            Revision::Ancestor(base_revision, generations) => {
                let Some(mut oid) = base_revision.resolve(repository)? else {
                    return Ok(None);
                };
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(&oid, repository)?;
                }

                Ok(Some(oid))
            }
        }
    }

    fn resolve_commit_parent(oid: &ObjectId, repository: &Repository) -> anyhow::Result<ObjectId> {
        let commit = repository
            .database()
            .parse_object_as_commit(oid)?
            .ok_or_else(|| anyhow::anyhow!("object {} is not a commit", oid))?;

        commit
            .parents()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("commit {} has no parent", oid.to_short_oid()))
    }

    fn resolve_oid(oid_str: &str, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        if ObjectId::is_full_hex(oid_str) {
            let oid = ObjectId::try_parse(oid_str.to_string())?;
            if !repository.database().contains(&oid) {
                return Ok(None);
            }
            return repository.peel_to_commit(&oid).map(Some);
        }

        let matches = repository.database().find_objects_by_prefix(oid_str)?;

        match matches.as_slice() {
            [] => Ok(None),
            [oid] => repository.peel_to_commit(oid).map(Some),
            _ => {
                let commit_matches = matches
                    .iter()
                    .filter(|oid| {
                        repository
                            .database()
                            .get_object_type(oid)
                            .map(|object_type| object_type == ObjectType::Commit)
                            .unwrap_or(false)
                    })
                    .collect::<Vec<_>>();

                if let [oid] = commit_matches.as_slice() {
                    return Ok(Some((*oid).clone()));
                }

                let mut error_msg = format!(
                    "short SHA1 {} is ambiguous\nhint: The candidates are:",
                    oid_str
                );
                for oid in &matches {
                    let object_type = repository
                        .database()
                        .get_object_type(oid)
                        .map(|object_type| object_type.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    error_msg.push_str(&format!("\nhint:   {} {}", oid.to_short_oid(), object_type));
                }
                anyhow::bail!(error_msg)
            }
        }
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= MIN_ABBREV_LENGTH && ObjectId::is_full_hex(&format!("{:0<40}", s))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}
