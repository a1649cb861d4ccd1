//! Per-column descriptive statistics.

use crate::frame::{Frame, Value};
use chrono::NaiveDateTime;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of one column, shaped by the column's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        column: String,
        count: usize,
        mean: f64,
        /// Sample standard deviation; absent below two values.
        std: Option<f64>,
        min: f64,
        #[serde(rename = "25%")]
        q25: f64,
        #[serde(rename = "50%")]
        median: f64,
        #[serde(rename = "75%")]
        q75: f64,
        max: f64,
    },
    Categorical {
        column: String,
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
    Timestamp {
        column: String,
        count: usize,
        first: NaiveDateTime,
        last: NaiveDateTime,
    },
}

impl ColumnSummary {
    pub fn column(&self) -> &str {
        match self {
            ColumnSummary::Numeric { column, .. }
            | ColumnSummary::Categorical { column, .. }
            | ColumnSummary::Timestamp { column, .. } => column,
        }
    }
}

/// Describe every column of the frame, in column order.
pub fn describe(frame: &Frame) -> Vec<ColumnSummary> {
    frame
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values = frame.column(idx).filter(|v| !v.is_missing()).collect();
            describe_column(name, values)
        })
        .collect()
}

fn describe_column(name: &str, values: Vec<&Value>) -> ColumnSummary {
    let count = values.len();

    if count > 0 {
        let numbers: Option<Vec<f64>> = values.iter().map(|v| v.as_f64()).collect();
        if let Some(mut numbers) = numbers {
            numbers.sort_by(f64::total_cmp);
            let mean = numbers.iter().sum::<f64>() / count as f64;
            let std = (count > 1).then(|| {
                let ss: f64 = numbers.iter().map(|x| (x - mean).powi(2)).sum();
                (ss / (count - 1) as f64).sqrt()
            });
            return ColumnSummary::Numeric {
                column: name.to_string(),
                count,
                mean,
                std,
                min: numbers[0],
                q25: quantile(&numbers, 0.25),
                median: quantile(&numbers, 0.5),
                q75: quantile(&numbers, 0.75),
                max: numbers[count - 1],
            };
        }

        let stamps: Option<Vec<NaiveDateTime>> = values.iter().map(|v| v.as_timestamp()).collect();
        if let Some(stamps) = stamps {
            if let (Some(first), Some(last)) = (stamps.iter().min(), stamps.iter().max()) {
                return ColumnSummary::Timestamp {
                    column: name.to_string(),
                    count,
                    first: *first,
                    last: *last,
                };
            }
        }
    }

    let mut freq: BTreeMap<String, usize> = BTreeMap::new();
    for value in &values {
        *freq.entry(value.to_string()).or_default() += 1;
    }
    // Strictly greater keeps the lexically first value on ties
    let mut top: Option<(&String, usize)> = None;
    for (value, n) in &freq {
        if top.is_none_or(|(_, best)| *n > best) {
            top = Some((value, *n));
        }
    }

    ColumnSummary::Categorical {
        column: name.to_string(),
        count,
        unique: freq.len(),
        top: top.map(|(v, _)| v.clone()),
        freq: top.map(|(_, n)| n).unwrap_or(0),
    }
}

/// Quantile of sorted values with linear interpolation.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.3}", v)
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).fg(Color::Green))
        .collect()
}

/// Render summaries as terminal tables, numeric columns first.
pub fn render_statistics(summaries: &[ColumnSummary]) -> String {
    let mut numeric = Table::new();
    numeric
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&[
            "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max",
        ]));

    let mut other = Table::new();
    other
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Column", "Count", "Unique", "Top", "Freq"]));

    let mut has_numeric = false;
    let mut has_other = false;
    for summary in summaries {
        match summary {
            ColumnSummary::Numeric {
                column,
                count,
                mean,
                std,
                min,
                q25,
                median,
                q75,
                max,
            } => {
                has_numeric = true;
                numeric.add_row(vec![
                    column.clone(),
                    count.to_string(),
                    fmt_num(*mean),
                    std.map(fmt_num).unwrap_or_default(),
                    fmt_num(*min),
                    fmt_num(*q25),
                    fmt_num(*median),
                    fmt_num(*q75),
                    fmt_num(*max),
                ]);
            }
            ColumnSummary::Categorical {
                column,
                count,
                unique,
                top,
                freq,
            } => {
                has_other = true;
                // Group keys hold newlines
                let top = top.as_deref().unwrap_or_default().replace('\n', " / ");
                other.add_row(vec![
                    column.clone(),
                    count.to_string(),
                    unique.to_string(),
                    top,
                    freq.to_string(),
                ]);
            }
            ColumnSummary::Timestamp {
                column,
                count,
                first,
                last,
            } => {
                has_other = true;
                other.add_row(vec![
                    column.clone(),
                    count.to_string(),
                    String::new(),
                    format!("{} .. {}", first, last),
                    String::new(),
                ]);
            }
        }
    }

    let mut out = String::new();
    if has_numeric {
        out.push_str(&numeric.to_string());
        out.push('\n');
    }
    if has_other {
        out.push_str(&other.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        let csv = "filename,date,successful,duration,avg_memory,max_memory,note,rules,wildcards\n\
a.out,2021-01-14 10:00:00,true,10,1,2,ok,align,sample=A\n\
b.out,2021-01-14 11:00:00,true,20,1,2,ok,align,sample=B\n\
c.out,2021-01-15 09:00:00,false,30,1,2,ok,count,sample=A\n\
d.out,2021-01-15 12:00:00,true,40,1,2,ok,count,\n";
        Frame::from_csv_reader(csv.as_bytes()).unwrap()
    }

    fn find<'a>(summaries: &'a [ColumnSummary], column: &str) -> &'a ColumnSummary {
        summaries.iter().find(|s| s.column() == column).unwrap()
    }

    #[test]
    fn test_numeric_summary() {
        let summaries = describe(&frame());
        match find(&summaries, "duration") {
            ColumnSummary::Numeric {
                count,
                mean,
                std,
                min,
                q25,
                median,
                q75,
                max,
                ..
            } => {
                assert_eq!(*count, 4);
                assert_eq!(*mean, 25.0);
                assert!((std.unwrap() - 12.909944).abs() < 1e-5);
                assert_eq!(
                    (*min, *q25, *median, *q75, *max),
                    (10.0, 17.5, 25.0, 32.5, 40.0)
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_categorical_summary() {
        let summaries = describe(&frame());
        assert_eq!(
            find(&summaries, "wildcards"),
            &ColumnSummary::Categorical {
                column: "wildcards".into(),
                count: 3,
                unique: 2,
                top: Some("sample=A".into()),
                freq: 2,
            }
        );
        match find(&summaries, "successful") {
            ColumnSummary::Categorical { top, freq, .. } => {
                assert_eq!(top.as_deref(), Some("true"));
                assert_eq!(*freq, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_summary() {
        let summaries = describe(&frame());
        assert!(matches!(
            find(&summaries, "date"),
            ColumnSummary::Timestamp { count: 4, .. }
        ));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let mut frame = Frame::new(["x"]);
        frame.push_row(vec![Value::Number(3.0)]).unwrap();
        assert!(matches!(
            describe(&frame)[0],
            ColumnSummary::Numeric { std: None, median, .. } if median == 3.0
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let summaries = describe(&frame());
        let json = serde_json::to_value(find(&summaries, "duration")).unwrap();
        assert_eq!(json["kind"], "numeric");
        assert_eq!(json["50%"], 25.0);
    }

    #[test]
    fn test_render_statistics() {
        let rendered = render_statistics(&describe(&frame()));
        assert!(rendered.contains("duration"));
        assert!(rendered.contains("Unique"));
        assert!(rendered.contains("17.500"));
    }
}
