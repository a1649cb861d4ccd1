//! CSV persistence for gathered job records.

use crate::record::{JobRecord, RecordRow};
use camino::Utf8Path;
use std::fs::{self, File};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write records to a CSV file, creating parent directories if needed.
pub fn write_records(path: &Utf8Path, records: &[JobRecord]) -> Result<(), TableError> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_records_to(file, records)
}

/// Write records as CSV to any writer.
pub fn write_records_to<W: Write>(writer: W, records: &[JobRecord]) -> Result<(), TableError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(RecordRow::from(record))?;
    }
    // An empty table still gets its header row.
    if records.is_empty() {
        wtr.write_record(crate::record::COLUMNS)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read records back from a CSV file.
pub fn read_records(path: &Utf8Path) -> Result<Vec<JobRecord>, TableError> {
    let file = File::open(path)?;
    read_records_from(file)
}

/// Read records from any CSV reader.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<JobRecord>, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<RecordRow>() {
        records.push(JobRecord::from(row?));
    }
    Ok(records)
}
