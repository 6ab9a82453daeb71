/// Formats a raw seconds count as `minutes:seconds` with zero-padded seconds.
///
/// Fractional seconds are truncated. Returns `None` for zero, negative or
/// non-finite input, which upstream uses for "no duration".
///
/// # Example
///
/// ```
/// use reelgrab::core::utils::format_duration;
///
/// assert_eq!(format_duration(75.0).as_deref(), Some("1:15"));
/// assert_eq!(format_duration(9.0).as_deref(), Some("0:09"));
/// assert_eq!(format_duration(0.0), None);
/// ```
pub fn format_duration(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }

    let total = seconds.trunc() as u64;
    Some(format!("{}:{:02}", total / 60, total % 60))
}

/// Returns at most `max_chars` characters of `text` for log lines.
///
/// Upstream bodies can be whole HTML pages; slicing by bytes would panic on a
/// multi-byte boundary.
pub fn log_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
