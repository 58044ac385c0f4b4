//! Human-readable byte counts.
//!
//! Base-1024 units, at most two decimals, trailing zeros trimmed:
//!
//! ```text
//! 0        → 0 Bytes
//! 512      → 512 Bytes
//! 1024     → 1 KB
//! 1536     → 1.5 KB
//! 1258291  → 1.2 MB
//! ```

const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Percentage of `original` saved by shrinking it to `output`.
///
/// Negative when the output grew. Zero for an empty original.
pub fn savings_percent(original: u64, output: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - output as f64 / original as f64) * 100.0
}

/// Two decimals, then drop trailing zeros and a dangling point.
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn plain_bytes() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
    }

    #[test]
    fn whole_kilobytes_drop_decimals() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(2048), "2 KB");
    }

    #[test]
    fn fractional_units_keep_two_decimals_at_most() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1000), "1000 Bytes");
        assert_eq!(format_size(1_258_291), "1.2 MB");
        assert_eq!(format_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn large_values_stop_at_terabytes() {
        assert_eq!(format_size(1024u64.pow(4)), "1 TB");
        assert_eq!(format_size(1024u64.pow(5)), "1024 TB");
    }

    #[test]
    fn savings_for_shrunk_output() {
        assert_eq!(savings_percent(1000, 250), 75.0);
    }

    #[test]
    fn savings_negative_when_output_grows() {
        assert_eq!(savings_percent(100, 150), -50.0);
    }

    #[test]
    fn savings_zero_for_empty_original() {
        assert_eq!(savings_percent(0, 10), 0.0);
    }
}
