use crate::areas::repository::Repository;
use crate::config::SortConfig;

impl Repository {
    pub fn rank(&self, revision: &str, config: &SortConfig) -> anyhow::Result<()> {
        let oid = self.resolve_revision(revision)?;
        let index = self.build_index(config)?;

        let rank = index.rank(&oid)?;
        writeln!(self.writer(), "{rank}")?;

        Ok(())
    }
}
