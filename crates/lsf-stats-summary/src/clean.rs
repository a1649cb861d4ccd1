//! Row cleaning and unit conversion.

use crate::frame::{Frame, FrameError, Value};
use lsf_stats_parsers::{mb_to_bytes, natural_delta, natural_size};

/// Memory columns reported in MB and converted to bytes.
pub const MEMORY_COLUMNS: [&str; 2] = ["avg_memory", "max_memory"];

/// Suffix of the human-readable companion columns.
pub const NATURAL_SUFFIX: &str = "_nat";

/// Drop every row with at least one missing cell.
///
/// Returns the number of dropped rows.
pub fn drop_incomplete(frame: &mut Frame) -> usize {
    let before = frame.len();
    frame.retain_rows(|row| row.iter().all(|v| !v.is_missing()));
    before - frame.len()
}

/// Scale memory columns from MB to bytes and add human-readable
/// `avg_memory_nat`, `max_memory_nat` and `duration_nat` columns.
pub fn convert_units(frame: &mut Frame) -> Result<(), FrameError> {
    for name in MEMORY_COLUMNS {
        let idx = frame.require_column(name)?;
        frame.map_column(idx, |v| match v {
            Value::Number(mb) => Value::Number(mb_to_bytes(*mb)),
            other => other.clone(),
        });

        let natural = frame
            .column(idx)
            .map(|v| natural_text(v, natural_size))
            .collect();
        frame.set_column(format!("{}{}", name, NATURAL_SUFFIX), natural)?;
    }

    let idx = frame.require_column("duration")?;
    let natural = frame
        .column(idx)
        .map(|v| natural_text(v, natural_delta))
        .collect();
    frame.set_column(format!("duration{}", NATURAL_SUFFIX), natural)?;

    Ok(())
}

fn natural_text(value: &Value, format: fn(f64) -> String) -> Value {
    value
        .as_f64()
        .map(|v| Value::Text(format(v)))
        .unwrap_or(Value::Missing)
}
