//! Parser for Snakemake execution traces (`*.err`).
//!
//! Snakemake logs every rule it executes inside a cluster job:
//!
//! ```text
//! rule call_variants:
//!     input: results/aligned/sample6.bam
//!     output: results/variants/sample6_chr2.vcf
//!     jobid: 35
//!     wildcards: sample=sample6, chrom=chr2
//! ```

use camino::Utf8Path;
use lsf_stats_parsers::join_sorted_unique;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;

static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"rule (.*):").expect("valid rule regex"));

static WILDCARDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wildcards: (.*)").expect("valid wildcards regex"));

/// Rule and wildcard identifiers found in an execution trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceInfo {
    /// Sorted, de-duplicated, comma-joined rule names
    pub rules: Option<String>,
    /// Sorted, de-duplicated, comma-joined wildcard strings
    pub wildcards: Option<String>,
}

/// Parse a trace file from disk.
pub fn parse_trace_file(path: &Utf8Path) -> std::io::Result<TraceInfo> {
    let content = fs::read_to_string(path)?;
    Ok(parse_trace(&content))
}

/// Parse trace text.
pub fn parse_trace(content: &str) -> TraceInfo {
    TraceInfo {
        rules: join_sorted_unique(captures(&RULE, content)),
        wildcards: join_sorted_unique(captures(&WILDCARDS, content)),
    }
}

/// All first-group captures of a pattern.
fn captures<'a>(re: &Regex, content: &'a str) -> impl Iterator<Item = &'a str> {
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}
