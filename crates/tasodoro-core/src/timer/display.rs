//! Display derivations shared by every renderer.

/// Format remaining time as `mm:ss`, rounding up to the next whole second.
///
/// Rounding up means the display only reaches `00:00` once the deadline has
/// actually passed. Periods of an hour or more keep counting in minutes
/// (`90:00`).
pub fn format_remaining(remaining_secs: f64) -> String {
    let secs = if remaining_secs.is_finite() && remaining_secs > 0.0 {
        remaining_secs.ceil() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Fraction of the period still remaining, in `[0, 1]`.
///
/// A zero-length period reports 1.
pub fn progress_fraction(remaining_secs: f64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 1.0;
    }
    (remaining_secs / total_secs as f64).clamp(0.0, 1.0)
}
