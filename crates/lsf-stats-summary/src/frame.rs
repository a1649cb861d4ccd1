//! Dynamic in-memory table used by the summarize stage.
//!
//! Columns are only known at runtime (wildcard splitting and grouping add
//! columns, queries reference them by name), so cells are held as [`Value`].

use camino::Utf8Path;
use chrono::NaiveDateTime;
use lsf_stats_parsers::{format_timestamp, parse_lsf_timestamp};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Column already exists: {0}")]
    DuplicateColumn(String),
    #[error("Invalid value {value:?} in column {column} (row {row})")]
    InvalidCell {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Expected {expected} values, got {found}")]
    Length { expected: usize, found: usize },
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(dt) => f.write_str(&format_timestamp(dt)),
        }
    }
}

/// How a column's raw text is typed on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Timestamp,
    Bool,
    Number,
    Text,
}

impl ColumnKind {
    /// Fixed kinds for the gathered columns.
    fn known(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Self::Timestamp),
            "successful" => Some(Self::Bool),
            "duration" | "avg_memory" | "max_memory" => Some(Self::Number),
            "filename" | "note" | "rules" | "wildcards" => Some(Self::Text),
            _ => None,
        }
    }

    /// Infer a kind from every non-empty cell of a column.
    fn infer(cells: &[&str]) -> Self {
        let non_empty: Vec<&str> = cells.iter().copied().filter(|s| !s.is_empty()).collect();
        if non_empty.is_empty() {
            Self::Text
        } else if non_empty.iter().all(|s| parse_bool(s).is_some()) {
            Self::Bool
        } else if non_empty.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
            Self::Number
        } else {
            Self::Text
        }
    }

    fn parse(self, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return Some(Value::Missing);
        }
        match self {
            Self::Timestamp => parse_lsf_timestamp(raw).map(Value::Timestamp),
            Self::Bool => parse_bool(raw).map(Value::Bool),
            Self::Number => raw.trim().parse().ok().map(Value::Number),
            Self::Text => Some(Value::Text(raw.to_string())),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A table of named columns and row-major cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create an empty frame with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Load a CSV file.
    pub fn from_csv_path(path: &Utf8Path) -> Result<Self, FrameError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load CSV from any reader, typing gathered columns by name and
    /// inferring the rest. Empty cells become [`Value::Missing`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, FrameError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut raw_rows = Vec::new();
        for record in rdr.records() {
            raw_rows.push(record?);
        }

        let kinds: Vec<ColumnKind> = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                ColumnKind::known(name).unwrap_or_else(|| {
                    let cells: Vec<&str> =
                        raw_rows.iter().map(|r| r.get(idx).unwrap_or("")).collect();
                    ColumnKind::infer(&cells)
                })
            })
            .collect();

        let mut frame = Self::new(columns);
        for (row_idx, record) in raw_rows.iter().enumerate() {
            let mut row = Vec::with_capacity(kinds.len());
            for (col_idx, kind) in kinds.iter().enumerate() {
                let raw = record.get(col_idx).unwrap_or("");
                let value = kind.parse(raw).ok_or_else(|| FrameError::InvalidCell {
                    column: frame.columns[col_idx].clone(),
                    row: row_idx,
                    value: raw.to_string(),
                })?;
                row.push(value);
            }
            frame.rows.push(row);
        }

        Ok(frame)
    }

    /// Write the frame as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), FrameError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize, FrameError> {
        self.column_index(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))
    }

    /// Iterate a column's cells.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Append a row; its length must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), FrameError> {
        if row.len() != self.columns.len() {
            return Err(FrameError::Length {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a new column.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(FrameError::Length {
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Replace a column's values, appending the column if it is new.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        match self.column_index(&name) {
            Some(idx) => {
                if values.len() != self.rows.len() {
                    return Err(FrameError::Length {
                        expected: self.rows.len(),
                        found: values.len(),
                    });
                }
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
                Ok(())
            }
            None => self.add_column(name, values),
        }
    }

    /// Apply a function to every cell of a column in place.
    pub fn map_column<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Keep rows by a precomputed mask (one entry per row).
    pub fn retain_mask(&mut self, mask: &[bool]) -> Result<(), FrameError> {
        if mask.len() != self.rows.len() {
            return Err(FrameError::Length {
                expected: self.rows.len(),
                found: mask.len(),
            });
        }
        let mut keep = mask.iter();
        self.rows.retain(|_| *keep.next().unwrap_or(&false));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
filename,date,successful,duration,avg_memory,max_memory,note,rules,wildcards,extra\n\
a.out,2021-01-14 10:20:30,true,12.5,100.0,200.0,ok,align,\"sample=A, rep=1\",3\n\
b.out,,,,,,,,,\n";

    #[test]
    fn test_load_types_known_columns() {
        let frame = Frame::from_csv_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(frame.len(), 2);

        let row = &frame.rows()[0];
        assert!(matches!(row[1], Value::Timestamp(_)));
        assert_eq!(row[2], Value::Bool(true));
        assert_eq!(row[3], Value::Number(12.5));
        assert_eq!(row[8], Value::Text("sample=A, rep=1".to_string()));
        assert_eq!(row[9], Value::Number(3.0));

        assert!(frame.rows()[1][1..].iter().all(Value::is_missing));
    }

    #[test]
    fn test_load_invalid_cell() {
        let csv = "filename,duration\na.out,fast\n";
        let err = Frame::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidCell { ref column, row: 0, .. } if column == "duration"
        ));
    }

    #[test]
    fn test_infer_text_column() {
        let csv = "filename,sample\na.out,A\nb.out,1\n";
        let frame = Frame::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(frame.rows()[1][1], Value::Text("1".to_string()));
    }

    #[test]
    fn test_add_and_set_column() {
        let mut frame = Frame::new(["a"]);
        frame.push_row(vec![Value::Number(1.0)]).unwrap();

        frame
            .add_column("b", vec![Value::Text("x".into())])
            .unwrap();
        assert!(matches!(
            frame.add_column("b", vec![Value::Missing]),
            Err(FrameError::DuplicateColumn(_))
        ));

        frame
            .set_column("b", vec![Value::Text("y".into())])
            .unwrap();
        assert_eq!(frame.rows()[0][1], Value::Text("y".into()));
        assert!(matches!(
            frame.push_row(vec![Value::Missing]),
            Err(FrameError::Length {
                expected: 2,
                found: 1,
            })
        ));
    }

    #[test]
    fn test_write_csv() {
        let frame = Frame::from_csv_reader(TABLE.as_bytes()).unwrap();
        let mut buf = Vec::new();
        frame.write_csv(&mut buf).unwrap();
        let reloaded = Frame::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(reloaded, frame);
    }

    #[test]
    fn test_retain_mask() {
        let mut frame = Frame::new(["a"]);
        for i in 0..3 {
            frame.push_row(vec![Value::Number(i as f64)]).unwrap();
        }
        frame.retain_mask(&[true, false, true]).unwrap();
        let values: Vec<_> = frame.column(0).filter_map(Value::as_f64).collect();
        assert_eq!(values, vec![0.0, 2.0]);
    }
}
