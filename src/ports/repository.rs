//! Repository port for value-table checkpoints.

use std::path::Path;

use crate::{Result, q_learning::ValueTable};

/// Port for persisting and loading value tables.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tabular_q::adapters::CsvRepository;
/// use tabular_q::ports::ValueTableRepository;
/// use tabular_q::q_learning::ValueTable;
///
/// let repo = CsvRepository::new();
/// repo.save(&ValueTable::new(), Path::new("q_table.csv"))?;
/// let restored = repo.load(Path::new("q_table.csv"))?;
/// assert!(restored.is_empty());
/// # Ok::<(), tabular_q::Error>(())
/// ```
pub trait ValueTableRepository {
    /// Write the table, replacing anything previously stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()>;

    /// Read a table back.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is stored at `path` or a record is malformed.
    fn load(&self, path: &Path) -> Result<ValueTable>;
}
