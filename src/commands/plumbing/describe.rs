use crate::areas::repository::Repository;
use crate::config::SortConfig;

impl Repository {
    /// Print the earliest release containing `revision`, or the predicted next one
    pub fn describe(&self, revision: &str, config: &SortConfig) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        let index = self.build_index(config)?;

        let tag = index.nearest_tag(&oid)?;
        writeln!(self.writer(), "{tag}")?;

        Ok(())
    }
}
