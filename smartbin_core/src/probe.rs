//! One-shot ultrasonic ranging.

use std::time::Duration;

use smartbin_traits::{Clock, RangingPins};
use tracing::{debug, trace};

use crate::config::ProbeCfg;
use crate::hw_error::map_hw_error;
use crate::util::{echo_us_to_cm, round2};

const TRIGGER_SETTLE: Duration = Duration::from_micros(2);
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Sanitized range reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// Centimetres, never negative and never beyond the probe's max range.
    Valid(f64),
    /// Timeout, out-of-range echo or pin fault.
    Invalid,
}

impl Distance {
    pub fn cm(self) -> Option<f64> {
        match self {
            Distance::Valid(cm) => Some(cm),
            Distance::Invalid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Distance::Valid(_))
    }
}

/// Drives one trigger/echo pair through independent ranging cycles.
///
/// No retries: the loop's polling cadence is the retry policy.
pub struct DistanceProbe<P> {
    pins: P,
    cfg: ProbeCfg,
}

impl<P: RangingPins> DistanceProbe<P> {
    pub fn new(mut pins: P, cfg: ProbeCfg) -> Self {
        if let Err(e) = pins.trigger_low() {
            debug!(error = %e, "could not idle trigger line");
        }
        Self { pins, cfg }
    }

    pub fn cfg(&self) -> &ProbeCfg {
        &self.cfg
    }

    /// Run one complete ranging cycle.
    pub fn measure(&mut self, clock: &dyn Clock) -> Distance {
        let echo_us = match self.cycle(clock) {
            Ok(us) => us,
            Err(e) => {
                debug!(fault = %map_hw_error(&*e), "ranging fault");
                return Distance::Invalid;
            }
        };
        if echo_us < 0 {
            trace!("echo timeout");
            return Distance::Invalid;
        }
        let cm = echo_us_to_cm(echo_us);
        if cm > self.cfg.max_range_cm {
            trace!(distance_cm = cm, "echo beyond max range");
            return Distance::Invalid;
        }
        Distance::Valid(round2(cm))
    }

    fn cycle(&mut self, clock: &dyn Clock) -> smartbin_traits::HwResult<i64> {
        self.pins.trigger_low()?;
        clock.sleep(TRIGGER_SETTLE);
        self.pins.trigger_high()?;
        clock.sleep(TRIGGER_PULSE);
        self.pins.trigger_low()?;
        self.pins.echo_high_us(self.cfg.timeout)
    }
}
