//! In-memory checkpoint repository for testing.
//!
//! Stores the exact CSV bytes [`super::CsvRepository`] would write, so tests
//! exercise the same encoding without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::csv_repository::{read_records, write_records};
use crate::{Result, error::Error, ports::ValueTableRepository, q_learning::ValueTable};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use tabular_q::adapters::InMemoryRepository;
/// use tabular_q::ports::ValueTableRepository;
/// use tabular_q::q_learning::ValueTable;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&ValueTable::new(), Path::new("q_table.csv"))?;
/// assert_eq!(repo.save_count(), 1);
/// assert!(repo.load(Path::new("q_table.csv"))?.is_empty());
/// # Ok::<(), tabular_q::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

#[derive(Default)]
struct Storage {
    files: HashMap<String, Vec<u8>>,
    saves: usize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Storage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of distinct paths currently stored.
    pub fn count(&self) -> usize {
        self.lock().files.len()
    }

    /// Total number of successful saves, counting overwrites.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Clear all stored tables and reset the save counter.
    pub fn clear(&self) {
        let mut storage = self.lock();
        storage.files.clear();
        storage.saves = 0;
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().files.contains_key(&key(path))
    }

    /// Raw CSV text stored at `path`.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.lock()
            .files
            .get(&key(path))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl ValueTableRepository for InMemoryRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        let mut bytes = Vec::new();
        write_records(table, &mut bytes)?;
        let mut storage = self.lock();
        storage.files.insert(key(path), bytes);
        storage.saves += 1;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        let storage = self.lock();
        let bytes = storage.files.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load checkpoint from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;
        read_records(bytes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateKey;

    fn table() -> ValueTable {
        ValueTable::from_entries([(StateKey::new("s0"), 1, 0.5)])
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let repo = InMemoryRepository::new();
        let path = Path::new("q_table.csv");
        assert_eq!(repo.count(), 0);
        assert!(!repo.contains(path));

        repo.save(&table(), path).unwrap();
        assert!(repo.contains(path));
        assert_eq!(repo.contents(path).as_deref(), Some("s0,1,0.5\n"));
        assert_eq!(repo.load(path).unwrap(), table());
    }

    #[test]
    fn test_overwrite_counts_saves() {
        let repo = InMemoryRepository::new();
        let path = Path::new("q_table.csv");
        repo.save(&table(), path).unwrap();
        repo.save(&ValueTable::new(), path).unwrap();
        assert_eq!(repo.count(), 1);
        assert_eq!(repo.save_count(), 2);
        assert!(repo.load(path).unwrap().is_empty());

        repo.clear();
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = InMemoryRepository::new();
        assert!(repo.load(Path::new("nonexistent")).is_err());
    }

    #[test]
    fn test_clone_shares_storage() {
        let repo1 = InMemoryRepository::new();
        let repo2 = repo1.clone();
        repo1.save(&table(), Path::new("shared")).unwrap();
        assert_eq!(repo2.load(Path::new("shared")).unwrap(), table());
    }
}
