//! Combine grouping variables into a single group column.

use crate::frame::{Frame, FrameError, Value};
use thiserror::Error;

/// Separator between grouping column names in the group column's name.
pub const NAME_SEPARATOR: &str = ", ";

/// Separator between grouping values in a group key.
pub const KEY_SEPARATOR: &str = "\n";

#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Grouping variable not found: {0}")]
    UnknownColumn(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Name of the group column for the given grouping variables.
pub fn group_column_name(variables: &[String]) -> String {
    variables.join(NAME_SEPARATOR)
}

/// Add the group key column built from `variables`.
///
/// Rows missing any grouping value are dropped. Returns the name of the
/// group column, or `None` when no variables were given.
pub fn apply_grouping(
    frame: &mut Frame,
    variables: &[String],
) -> Result<Option<String>, GroupingError> {
    if variables.is_empty() {
        return Ok(None);
    }

    let indices = variables
        .iter()
        .map(|v| {
            frame
                .column_index(v)
                .ok_or_else(|| GroupingError::UnknownColumn(v.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let before = frame.len();
    frame.retain_rows(|row| indices.iter().all(|&i| !row[i].is_missing()));
    let dropped = before - frame.len();
    if dropped > 0 {
        tracing::info!(
            "Dropped {} rows without a value for every grouping variable",
            dropped
        );
    }

    let keys = frame
        .rows()
        .iter()
        .map(|row| {
            let parts: Vec<String> = indices.iter().map(|&i| row[i].to_string()).collect();
            Value::Text(parts.join(KEY_SEPARATOR))
        })
        .collect();

    let name = group_column_name(variables);
    frame.set_column(name.clone(), keys)?;
    Ok(Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        let mut frame = Frame::new(["sample", "rep"]);
        let rows = [("A", Some("1")), ("B", Some("2")), ("C", None)];
        for (sample, rep) in rows {
            frame
                .push_row(vec![
                    Value::Text(sample.into()),
                    rep.map(|r| Value::Text(r.into())).unwrap_or(Value::Missing),
                ])
                .unwrap();
        }
        frame
    }

    #[test]
    fn test_no_variables() {
        let mut frame = frame();
        assert_eq!(apply_grouping(&mut frame, &[]).unwrap(), None);
        assert_eq!(frame.columns().len(), 2);
    }

    #[test]
    fn test_single_variable() {
        let mut frame = frame();
        let name = apply_grouping(&mut frame, &["sample".to_string()]).unwrap();
        assert_eq!(name.as_deref(), Some("sample"));
        // Overwrites in place, no new column
        assert_eq!(frame.columns().len(), 2);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_combined_variables() {
        let mut frame = frame();
        let vars = vec!["sample".to_string(), "rep".to_string()];
        let name = apply_grouping(&mut frame, &vars).unwrap().unwrap();
        assert_eq!(name, "sample, rep");
        assert_eq!(frame.len(), 2);

        let idx = frame.require_column(&name).unwrap();
        assert_eq!(frame.rows()[0][idx], Value::Text("A\n1".into()));
        assert_eq!(frame.rows()[1][idx], Value::Text("B\n2".into()));
    }

    #[test]
    fn test_unknown_variable() {
        let mut frame = frame();
        let err = apply_grouping(&mut frame, &["lane".to_string()]).unwrap_err();
        assert!(matches!(err, GroupingError::UnknownColumn(c) if c == "lane"));
    }
}
