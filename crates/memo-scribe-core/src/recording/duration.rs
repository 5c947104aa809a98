/// Renders seconds as `MM:SS`.
///
/// Minutes are unbounded (`3725.0` renders `"62:05"`); fractional seconds
/// truncate. Negative and non-finite inputs render as `"00:00"`.
pub fn format_duration(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let minutes = (seconds / 60.0).floor() as u64;
    let remainder = (seconds % 60.0).floor() as u64;

    format!("{:02}:{:02}", minutes, remainder)
}
