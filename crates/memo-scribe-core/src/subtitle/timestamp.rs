/// Tolerance in milliseconds added before truncating.
///
/// Absorbs binary representation error, so `1.001` renders `.001` rather
/// than `.000`. It is far below the nanosecond scale, so a value genuinely
/// short of a millisecond boundary still truncates down.
const MILLIS_EPSILON: f64 = 1e-9;

/// Renders seconds as `HH:MM:SS<sep>mmm`.
///
/// Sub-millisecond remainders truncate. Hours widen past two digits.
/// Negative and non-finite inputs render as zero.
pub(crate) fn format_timestamp(seconds: f64, separator: char) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let total_millis = (seconds * 1000.0 + MILLIS_EPSILON).floor() as u64;

    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, separator, millis
    )
}
