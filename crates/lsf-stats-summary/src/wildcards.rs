//! Split the aggregate `wildcards` string into one column per key.

use crate::frame::{Frame, FrameError, Value};
use thiserror::Error;

/// Separator between `key=value` entries, as written by Snakemake.
const ENTRY_SEPARATOR: &str = ", ";

/// Suffix for wildcard keys that collide with an existing column.
const COLLISION_SUFFIX: &str = "_wildcard";

#[derive(Error, Debug)]
pub enum WildcardError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("Row {row} has no wildcards to split")]
    Missing { row: usize },
    #[error("Row {row}: wildcard entry {entry:?} is not of the form key=value")]
    Malformed { row: usize, entry: String },
}

/// Add one column per distinct wildcard key.
///
/// Keys appear in first-seen order. A row lacking a key gets a missing
/// cell; a key that collides with an existing column is suffixed with
/// `_wildcard`. Every row must hold at least one `key=value` entry.
///
/// Returns the names of the added columns.
pub fn split_wildcards(frame: &mut Frame) -> Result<Vec<String>, WildcardError> {
    let idx = frame.require_column("wildcards")?;

    let mut keys: Vec<String> = Vec::new();
    let mut parsed: Vec<Vec<(String, String)>> = Vec::with_capacity(frame.len());

    for (row, cell) in frame.column(idx).enumerate() {
        let text = cell
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or(WildcardError::Missing { row })?;

        let mut pairs = Vec::new();
        for entry in text.split(ENTRY_SEPARATOR) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| WildcardError::Malformed {
                    row,
                    entry: entry.to_string(),
                })?;
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
            pairs.push((key.to_string(), value.to_string()));
        }
        parsed.push(pairs);
    }

    let mut added = Vec::with_capacity(keys.len());
    for key in &keys {
        let values = parsed
            .iter()
            .map(|pairs| {
                // Later entries win when a key repeats within a row.
                pairs
                    .iter()
                    .rev()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| Value::Text(v.clone()))
                    .unwrap_or(Value::Missing)
            })
            .collect();

        let name = if frame.has_column(key) {
            format!("{}{}", key, COLLISION_SUFFIX)
        } else {
            key.clone()
        };
        frame.add_column(name.clone(), values)?;
        added.push(name);
    }

    tracing::debug!("Split wildcards into columns: {}", added.join(", "));
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(wildcards: &[Value]) -> Frame {
        let mut frame = Frame::new(["filename", "wildcards"]);
        for (i, wc) in wildcards.iter().enumerate() {
            frame
                .push_row(vec![Value::Text(format!("{}.out", i)), wc.clone()])
                .unwrap();
        }
        frame
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_split_single_row() {
        let mut frame = frame(&[text("sample=A, rep=1")]);
        let added = split_wildcards(&mut frame).unwrap();
        assert_eq!(added, vec!["sample", "rep"]);

        let sample = frame.require_column("sample").unwrap();
        let rep = frame.require_column("rep").unwrap();
        assert_eq!(frame.rows()[0][sample], text("A"));
        assert_eq!(frame.rows()[0][rep], text("1"));
        // The aggregate column is kept
        assert!(frame.has_column("wildcards"));
    }

    #[test]
    fn test_split_missing_key_is_missing_cell() {
        let mut frame = frame(&[text("sample=A, rep=1"), text("sample=B")]);
        split_wildcards(&mut frame).unwrap();
        let rep = frame.require_column("rep").unwrap();
        assert_eq!(frame.rows()[1][rep], Value::Missing);
    }

    #[test]
    fn test_split_value_keeps_later_equals() {
        let mut frame = frame(&[text("expr=a=b")]);
        split_wildcards(&mut frame).unwrap();
        let expr = frame.require_column("expr").unwrap();
        assert_eq!(frame.rows()[0][expr], text("a=b"));
    }

    #[test]
    fn test_split_collision_is_suffixed() {
        let mut frame = frame(&[text("filename=x")]);
        let added = split_wildcards(&mut frame).unwrap();
        assert_eq!(added, vec!["filename_wildcard"]);
    }

    #[test]
    fn test_split_malformed_entry_fails() {
        let mut frame = frame(&[text("sample=A"), text("oops")]);
        assert!(matches!(
            split_wildcards(&mut frame),
            Err(WildcardError::Malformed { row: 1, .. })
        ));
    }

    #[test]
    fn test_split_missing_wildcards_fails() {
        let mut frame = frame(&[Value::Missing]);
        assert!(matches!(
            split_wildcards(&mut frame),
            Err(WildcardError::Missing { row: 0 })
        ));
    }
}
