//! Duration helpers for log output.

use std::time::Duration;

/// Render milliseconds as `"<m>m,<s>s"`, dropping zero components.
///
/// Sub-second remainders are not shown; anything below one second renders
/// as `"<ms>ms"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration_ms(ms: f64) -> String {
    let total_ms = if ms.is_finite() && ms > 0.0 { ms as u64 } else { 0 };
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1000) % 60;

    let mut out = String::new();
    if minutes > 0 {
        out.push_str(&format!("{minutes}m,"));
    }
    if seconds > 0 {
        out.push_str(&format!("{seconds}s"));
    }
    if out.is_empty() {
        out = format!("{total_ms}ms");
    }
    out
}

/// Convert a millisecond offset into a sleepable duration. Negative values clamp to zero.
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}
