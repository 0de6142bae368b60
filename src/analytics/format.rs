/// Render a second count as a human-readable duration.
///
/// Truncates to whole seconds first, then picks the largest non-empty
/// bucket: hours+minutes+seconds, minutes+seconds, or seconds alone.
/// Negative input is undefined.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}小時 {minutes}分 {secs}秒")
    } else if minutes > 0 {
        format!("{minutes}分 {secs}秒")
    } else {
        format!("{secs}秒")
    }
}
