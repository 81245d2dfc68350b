use std::time::Duration;

/// Wait after emitting `fragment`: `ceil(chars / rate)` seconds. A rate of
/// 0 disables pacing.
pub fn pacing_delay(fragment: &str, chars_per_second: u32) -> Duration {
    if chars_per_second == 0 {
        return Duration::ZERO;
    }
    let chars = fragment.chars().count() as u64;
    Duration::from_secs(chars.div_ceil(u64::from(chars_per_second)))
}
