//! Duration formatting shared by the ruler labels, the LRC export and the
//! footage report.

/// Compact clock format for ruler labels and status text, e.g. `1:05`.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// LRC timestamp body, e.g. `02:07.50`: minutes zero-padded to two digits,
/// seconds with two decimals zero-padded to width five.
pub fn format_lrc(seconds: f64) -> String {
    let clamped = seconds.max(0.0);
    let minutes = (clamped / 60.0).floor() as u64;
    let remainder = clamped - minutes as f64 * 60.0;
    format!("{minutes:02}:{remainder:05.2}")
}
