//! Reader registry: an ordered list of [`Reader`]s built once at process
//! start (§9 Design Notes). The core iterates the list and uses the first
//! reader that resolves a container without error; errors from readers
//! other than the last are swallowed and logged at `debug` — only the last
//! reader's error (or `MissingContainer` if the list is empty) propagates.

use std::path::PathBuf;

use provtool_core::ProvtoolError;
use tracing::debug;

use crate::reader::{ReadOptions, Reader, Resolved};

pub struct ReaderRegistry {
    readers: Vec<Box<dyn Reader>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// The default registry: just the file-system reader, registered under
    /// the name `"file"`.
    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::reader::FileReader));
        registry
    }

    pub fn register(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn names(&self) -> Vec<&str> {
        self.readers.iter().map(|r| r.name()).collect()
    }

    /// Resolve a container id by trying each registered reader in order.
    pub fn read(&self, opts: &ReadOptions, cid: &str) -> Result<Resolved, ProvtoolError> {
        if self.readers.is_empty() {
            return Err(ProvtoolError::MissingContainer(cid.to_string()));
        }
        let mut last_err = None;
        for reader in &self.readers {
            match reader.read(opts, cid) {
                Ok(resolved) => return Ok(resolved),
                Err(e) => {
                    debug!(reader = reader.name(), cid, error = %e, "reader did not resolve container");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| ProvtoolError::MissingContainer(cid.to_string())))
    }

    /// Label search across every registered reader; results are merged and
    /// deduplicated.
    pub fn search(&self, opts: &ReadOptions, query: &str) -> Result<Vec<PathBuf>, ProvtoolError> {
        let mut all = Vec::new();
        for reader in &self.readers {
            match reader.search(opts, query) {
                Ok(mut hits) => all.append(&mut hits),
                Err(e) => debug!(reader = reader.name(), error = %e, "reader search failed"),
            }
        }
        all.sort();
        all.dedup();
        Ok(all)
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::default_registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_reports_missing_container() {
        let registry = ReaderRegistry::new();
        let opts = ReadOptions::new(std::env::temp_dir());
        let err = registry.read(&opts, "deadbeef");
        assert!(matches!(err, Err(ProvtoolError::MissingContainer(_))));
    }

    #[test]
    fn default_registry_contains_file_reader() {
        let registry = ReaderRegistry::default_registry();
        assert_eq!(registry.names(), vec!["file"]);
    }
}
