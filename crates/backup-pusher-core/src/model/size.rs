/// Size formatting utilities: megabyte columns and human-readable counts.
///
/// All internal sizes are exact `u64` byte totals. Truncation and floating
/// point only happen at the display boundary.

/// Decimal megabyte, as shown in the "Size (MB)" column.
pub const BYTES_PER_MB: u64 = 1_000_000;

/// Whole megabytes, truncating toward zero.
#[inline]
pub fn whole_megabytes(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Uses decimal units (1 KB = 1000 bytes) so the result agrees with the
/// megabyte column.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1_000.0;
    const MB: f64 = KB * 1_000.0;
    const GB: f64 = MB * 1_000.0;
    const TB: f64 = GB * 1_000.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else if b < TB {
        format!("{:.2} GB", b / GB)
    } else {
        format!("{:.2} TB", b / TB)
    }
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        return count.to_string();
    }
    let s = count.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
