//! Memory unit conversion and formatting.

/// LSF reports memory in decimal megabytes.
pub const BYTES_PER_MB: f64 = 1_000_000.0;

/// Decimal size suffixes above bytes.
const SIZE_SUFFIXES: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Convert megabytes as reported by LSF to bytes.
pub fn mb_to_bytes(mb: f64) -> f64 {
    mb * BYTES_PER_MB
}

/// Format a byte count as a human-readable decimal size.
///
/// - below 1000: "1 Byte", "512 Bytes"
/// - otherwise one decimal with a decimal suffix: "1.5 kB", "100.0 MB"
pub fn natural_size(bytes: f64) -> String {
    let base = 1000.0_f64;
    let abs_bytes = bytes.abs();

    if abs_bytes == 1.0 {
        return format!("{} Byte", bytes as i64);
    }
    if abs_bytes < base {
        return format!("{} Bytes", bytes.trunc() as i64);
    }

    let mut unit = base;
    for suffix in SIZE_SUFFIXES {
        unit *= base;
        if abs_bytes < unit {
            return format!("{:.1} {}", base * bytes / unit, suffix);
        }
    }

    // Beyond yottabytes: keep the largest suffix.
    let largest = SIZE_SUFFIXES[SIZE_SUFFIXES.len() - 1];
    format!("{:.1} {}", base * bytes / unit, largest)
}
