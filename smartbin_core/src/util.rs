//! Small numeric helpers shared by the probe and the estimator.

/// Speed of sound expressed as microseconds per centimetre, one way.
pub const US_PER_CM_ONE_WAY: f64 = 29.1;

/// Convert a round-trip echo time to a one-way distance in centimetres.
#[inline]
pub fn echo_us_to_cm(round_trip_us: i64) -> f64 {
    (round_trip_us as f64 / 2.0) / US_PER_CM_ONE_WAY
}

/// Round to one decimal place, ties to even.
#[inline]
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}

/// Round to two decimal places, ties away from zero.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
