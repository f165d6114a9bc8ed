use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until `is_high` reports `level`, or until `deadline` passes.
/// Returns the instant the level was first observed.
pub fn wait_for_level(
    mut is_high: impl FnMut() -> bool,
    level: bool,
    deadline: Instant,
) -> Result<Instant> {
    loop {
        let now = Instant::now();
        if is_high() == level {
            return Ok(now);
        }
        if now >= deadline {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }
}

/// Measure the width of the next high pulse on a line.
///
/// Both the wait for the rising edge and the pulse itself are bounded by
/// `timeout`, each measured from its own start.
pub fn measure_high_pulse(mut is_high: impl FnMut() -> bool, timeout: Duration) -> Result<Duration> {
    let rise = wait_for_level(&mut is_high, true, Instant::now() + timeout)?;
    let fall = wait_for_level(&mut is_high, false, rise + timeout)?;
    Ok(fall.saturating_duration_since(rise))
}
