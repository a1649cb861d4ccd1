use camino::Utf8Path;
use chrono::NaiveDate;
use lsf_stats_core::{JobRecord, ResourceUsage, write_records};
use lsf_stats_summary::{
    BucketWidth, Frame, Query, SummaryOptions, Value, dump_intermediate, prepare, write_statistics,
};
use tempfile::TempDir;

fn job(i: u32) -> JobRecord {
    let mut record = JobRecord::filename_only(format!("logs/job{}.out", i));
    record.date = NaiveDate::from_ymd_opt(2021, 1, 14)
        .and_then(|d| d.and_hms_opt(8 + i % 4, i % 60, 0));
    record.successful = Some(i % 5 != 0);
    record.usage = Some(ResourceUsage {
        duration: f64::from(30 + i * 45),
        avg_memory: f64::from(10 + i * 3),
        max_memory: f64::from(20 + i * 4),
    });
    record.note = Some("Successfully completed.".to_string());
    record.rules = Some(if i % 2 == 0 { "align" } else { "count" }.to_string());
    record.wildcards = Some(format!("sample=S{}, lane={}", i % 3, i % 2));
    record
}

fn gathered_table(dir: &Utf8Path) -> Frame {
    let mut records: Vec<JobRecord> = (0..24).map(job).collect();
    records.push(JobRecord::filename_only("logs/broken.out"));

    let path = dir.join("log_statistics.csv");
    write_records(&path, &records).unwrap();
    Frame::from_csv_path(&path).unwrap()
}

#[test]
fn query_never_increases_row_count() {
    let temp = TempDir::new().unwrap();
    let frame = gathered_table(Utf8Path::from_path(temp.path()).unwrap());

    for source in [
        "successful",
        "duration > 300 and rules == 'count'",
        "not (avg_memory < 3e7) | rules in ['align']",
        "date >= '2021-01-14 10:00:00'",
        "filename != 'nothing'",
    ] {
        let mut filtered = frame.clone();
        Query::parse(source).unwrap().filter(&mut filtered).unwrap();
        assert!(
            filtered.len() <= frame.len(),
            "query {:?} added rows",
            source
        );
    }
}

#[test]
fn summarize_grouped_by_wildcards() {
    let temp = TempDir::new().unwrap();
    let dir = Utf8Path::from_path(temp.path()).unwrap();
    let frame = gathered_table(dir);
    assert_eq!(frame.len(), 25);

    let options = SummaryOptions {
        split_wildcards: true,
        grouping_variables: vec!["sample".to_string()],
        query: Some("successful".to_string()),
        output_dir: dir.join("plots"),
        bucket: BucketWidth::Minute,
        ..Default::default()
    };
    let prepared = prepare(frame, &options).unwrap();

    // Broken row dropped, every fifth job failed
    assert_eq!(prepared.frame.len(), 19);
    assert_eq!(prepared.group_column.as_deref(), Some("sample"));

    let series = &prepared.completions;
    let labels: Vec<_> = series.lines.iter().map(|l| l.label()).collect();
    assert_eq!(labels, vec!["S0", "S1", "S2"]);
    for line in &series.lines {
        assert_eq!(line.cumulative.len(), series.buckets.len());
        assert_eq!(line.cumulative[0], 0);
        assert!(line.cumulative.windows(2).all(|w| w[0] <= w[1]));
    }
    let total: u64 = series.lines.iter().map(|l| l.total()).sum();
    assert_eq!(total, 19);

    let memory = prepared.frame.require_column("avg_memory").unwrap();
    assert_eq!(
        prepared.frame.rows()[0][memory],
        Value::Number(13_000_000.0)
    );

    let stats = write_statistics(&options.output_dir, &prepared.statistics).unwrap();
    assert!(stats.exists());

    let [table, completions] =
        dump_intermediate(&options.output_dir, &prepared.frame, series).unwrap();
    let reloaded = Frame::from_csv_path(&table).unwrap();
    assert_eq!(reloaded.len(), 19);
    assert!(reloaded.has_column("lane"));
    assert!(completions.exists());
}
