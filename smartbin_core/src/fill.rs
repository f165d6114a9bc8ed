//! Fill-level estimation from the downward-facing ranger.

use crate::probe::Distance;
use crate::util::round1;

/// Map a sanitized distance to a fill percentage in `[0, 100]`, one decimal.
///
/// Invalid, non-positive or taller-than-the-bin readings yield exactly 0:
/// a broken sensor must never report the bin as full.
pub fn estimate(distance: Distance, bin_height_cm: f64) -> f64 {
    let Some(d) = distance.cm() else {
        return 0.0;
    };
    if d <= 0.0 || d > bin_height_cm || bin_height_cm <= 0.0 {
        return 0.0;
    }
    let pct = ((bin_height_cm - d) / bin_height_cm) * 100.0;
    round1(pct.clamp(0.0, 100.0))
}
