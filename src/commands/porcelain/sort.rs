use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::revision::Revision;
use crate::artifacts::series::document::first_word;
use crate::config::SortConfig;
use anyhow::Context;
use std::collections::HashMap;
use std::io::BufRead;

impl Repository {
    /// Print input lines in upstream order of the commit each one starts with
    ///
    /// Lines naming the same commit stay together in input order. Lines whose
    /// commit is outside the indexed history are listed in the error after the
    /// sorted output.
    pub fn sort_lines(&self, config: &SortConfig, input: &mut dyn BufRead) -> anyhow::Result<()> {
        let mut groups: Vec<(ObjectId, Vec<String>)> = Vec::new();
        let mut group_of: HashMap<ObjectId, usize> = HashMap::new();

        for (i, line) in input.lines().enumerate() {
            let line = line.context("Unable to read standard input")?;
            let number = i + 1;

            let revision = first_word(&line)
                .and_then(|word| Revision::try_parse(word).ok())
                .with_context(|| {
                    format!("did not find a commit hash on line {number}: {}", line.trim())
                })?;
            let oid = revision.resolve(self)?.with_context(|| {
                format!(
                    "commit hash on line {number} not found in the repository: {}",
                    line.trim()
                )
            })?;

            match group_of.get(&oid) {
                Some(&group) => groups[group].1.push(line),
                None => {
                    group_of.insert(oid.clone(), groups.len());
                    groups.push((oid, vec![line]));
                }
            }
        }

        let index = self.build_index(config)?;

        let (mut found, missing): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .partition(|(oid, _)| index.contains(oid));
        found.sort_by_key(|(oid, _)| index.rank(oid).ok());

        for line in found.iter().flat_map(|(_, lines)| lines) {
            writeln!(self.writer(), "{line}")?;
        }

        if !missing.is_empty() {
            let lines = missing
                .iter()
                .flat_map(|(_, lines)| lines)
                .map(|line| line.trim())
                .collect::<Vec<_>>();
            anyhow::bail!(
                "the following entries were not found in the indexed heads: {}",
                lines.join("; ")
            );
        }

        Ok(())
    }
}
