use crate::areas::repository::Repository;
use crate::artifacts::ordering::cache::{CACHE_VERSION, IndexCache};
use crate::artifacts::ordering::commit_order_index::CommitOrderIndex;
use crate::config::SortConfig;

impl Repository {
    /// Print the heads the cached index was built from next to the current ones
    ///
    /// Nothing is rebuilt; the last line says whether the next run would.
    pub fn dump_heads(&self, config: &SortConfig) -> anyhow::Result<()> {
        let current = CommitOrderIndex::cache_key(self, &config.upstream, &config.tag_pattern)?;
        let cached = config
            .cache_path
            .as_ref()
            .and_then(|path| IndexCache::new(path.clone()).load())
            .map(|snapshot| snapshot.key);

        match &cached {
            None if config.cache_path.is_none() => writeln!(self.writer(), "No cache configured")?,
            None => writeln!(self.writer(), "No usable cache")?,
            Some(key) => {
                writeln!(self.writer(), "Cached heads (version {}):", key.version)?;
                for (name, oid) in &key.roots {
                    writeln!(self.writer(), "\t{name} {oid}")?;
                }
            }
        }

        writeln!(self.writer(), "Current heads (version {CACHE_VERSION}):")?;
        for (name, oid) in &current.roots {
            writeln!(self.writer(), "\t{name} {oid}")?;
        }

        let action = if cached.as_ref() == Some(&current) {
            "Will not"
        } else {
            "Will"
        };
        writeln!(self.writer(), "{action} rebuild history")?;

        Ok(())
    }
}
