//! Per-group job measurements pulled from the reshaped table.

use lsf_stats_summary::{Frame, FrameError};
use std::collections::BTreeMap;

/// Runtime and memory of the jobs in one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupData {
    /// Group key, `None` when the table is not grouped
    pub label: Option<String>,
    /// Run time in seconds
    pub duration: Vec<f64>,
    /// Average memory in bytes
    pub avg_memory: Vec<f64>,
}

impl GroupData {
    /// Legend text; multi-column keys are joined on one line.
    pub fn legend(&self) -> String {
        self.label
            .as_deref()
            .map(|l| l.replace('\n', " / "))
            .unwrap_or_default()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let memory = self.avg_memory.iter().copied();
        self.duration.iter().copied().zip(memory)
    }
}

/// Split the table into groups sorted by key.
///
/// Rows lacking a numeric runtime or memory value are skipped.
pub fn group_data(
    frame: &Frame,
    group_column: Option<&str>,
) -> Result<Vec<GroupData>, FrameError> {
    let duration_idx = frame.require_column("duration")?;
    let memory_idx = frame.require_column("avg_memory")?;
    let group_idx = group_column.map(|c| frame.require_column(c)).transpose()?;

    let mut groups: BTreeMap<Option<String>, GroupData> = BTreeMap::new();
    for row in frame.rows() {
        let duration = row[duration_idx].as_f64();
        let memory = row[memory_idx].as_f64();
        let (Some(duration), Some(memory)) = (duration, memory) else {
            continue;
        };
        let label = group_idx.map(|i| row[i].to_string());
        let group = groups.entry(label.clone()).or_insert_with(|| GroupData {
            label,
            ..Default::default()
        });
        group.duration.push(duration);
        group.avg_memory.push(memory);
    }

    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsf_stats_summary::Value;

    fn frame() -> Frame {
        let mut frame = Frame::new(["duration", "avg_memory", "sample, rep"]);
        let rows = [
            (10.0, 1e6, "B\n1"),
            (20.0, 2e6, "A\n1"),
            (30.0, 3e6, "B\n1"),
        ];
        for (d, m, g) in rows {
            let row = vec![
                Value::Number(d),
                Value::Number(m),
                Value::Text(g.into()),
            ];
            frame.push_row(row).unwrap();
        }
        frame
    }

    #[test]
    fn test_ungrouped() {
        let groups = group_data(&frame(), None).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].duration, vec![10.0, 20.0, 30.0]);
        assert_eq!(groups[0].legend(), "");
    }

    #[test]
    fn test_grouped_sorted() {
        let groups = group_data(&frame(), Some("sample, rep")).unwrap();
        let legends: Vec<_> = groups.iter().map(GroupData::legend).collect();
        assert_eq!(legends, vec!["A / 1", "B / 1"]);
        assert_eq!(
            groups[1].points().collect::<Vec<_>>(),
            vec![(10.0, 1e6), (30.0, 3e6)]
        );
    }

    #[test]
    fn test_missing_column() {
        let frame = Frame::new(["duration"]);
        assert!(matches!(
            group_data(&frame, None),
            Err(FrameError::MissingColumn(c)) if c == "avg_memory"
        ));
    }
}
