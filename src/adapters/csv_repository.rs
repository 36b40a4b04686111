//! CSV implementation of the value-table repository.
//!
//! One `state,action,value` record per line, no header, sorted by state key
//! then action. Each save replaces the file.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::debug;

use crate::{
    Result,
    error::Error,
    ports::ValueTableRepository,
    q_learning::ValueTable,
    types::{Action, StateKey},
};

/// File-backed checkpoint storage in CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRepository;

impl CsvRepository {
    pub fn new() -> Self {
        Self
    }
}

/// Write `table` as CSV records to any sink.
///
/// # Errors
///
/// Returns an error if the sink cannot be written.
pub fn write_records<W: Write>(table: &ValueTable, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);
    for (state, action, value) in table.sorted_entries() {
        writer.serialize((state.as_str(), action, value))?;
    }
    writer.flush().map_err(|source| Error::Io {
        operation: "flush checkpoint records".to_string(),
        source,
    })?;
    Ok(())
}

/// Read CSV records from any source into a table.
///
/// # Errors
///
/// Returns [`Error::MalformedCheckpoint`] naming the 1-based record number
/// of the first record that is not `state,action,value`.
pub fn read_records<R: Read>(source: R) -> Result<ValueTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);
    let mut table = ValueTable::new();
    for (index, record) in reader.records().enumerate() {
        let number = index as u64 + 1;
        let record = record?;
        let malformed = |message: String| Error::MalformedCheckpoint {
            record: number,
            message,
        };
        if record.len() != 3 {
            return Err(malformed(format!("expected 3 fields, found {}", record.len())));
        }
        let state = StateKey::parse(&record[0]).map_err(|e| malformed(e.to_string()))?;
        let action: Action = record[1]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("action '{}' is not an integer", &record[1])))?;
        let value: f64 = record[2]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("value '{}' is not a number", &record[2])))?;
        table.insert(state, action, value);
    }
    Ok(table)
}

impl ValueTableRepository for CsvRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create checkpoint {path:?}"),
            source,
        })?;
        write_records(table, BufWriter::new(file))?;
        debug!("wrote {} values to {path:?}", table.len());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open checkpoint {path:?}"),
            source,
        })?;
        let table = read_records(BufReader::new(file))?;
        debug!("read {} values from {path:?}", table.len());
        Ok(table)
    }
}
