//! Cooldown-gated full-bin alert.

use std::time::{Duration, Instant};

use smartbin_traits::{Buzzer, Clock, Indicators, Led};
use tracing::{info, warn};

use crate::config::AlertCfg;
use crate::hw_error::{Device, drive};
use crate::indicator::StatusIndicator;

#[derive(Debug)]
pub struct AlertManager {
    cfg: AlertCfg,
    last_alert: Option<Instant>,
    active: bool,
}

impl AlertManager {
    pub fn new(cfg: AlertCfg) -> Self {
        Self {
            cfg,
            last_alert: None,
            active: false,
        }
    }

    /// Returns true when an alert fired during this call.
    ///
    /// At or above `threshold` an alert fires only once `cooldown` has
    /// strictly elapsed since the previous one. Below it the active flag is
    /// cleared and the cooldown clock is left alone. A failing buzzer or LED
    /// is logged; the alert still counts as fired.
    pub fn check_and_alert<I: Indicators>(
        &mut self,
        fill_pct: f64,
        threshold: f64,
        now: Instant,
        buzzer: &mut dyn Buzzer,
        leds: &mut StatusIndicator<I>,
        clock: &dyn Clock,
    ) -> bool {
        if fill_pct < threshold {
            self.active = false;
            return false;
        }
        if let Some(last) = self.last_alert
            && now.saturating_duration_since(last) <= self.cfg.cooldown
        {
            return false;
        }

        self.last_alert = Some(now);
        self.active = true;
        info!(fill_pct, threshold, "bin full, alerting");
        if let Err(e) = drive(Device::Buzzer, buzzer.alert(self.cfg.beeps)) {
            warn!(error = %e, "alert sound failed");
        }
        if let Err(e) = leds.blink(Led::Red, self.cfg.blinks, self.cfg.blink_interval, clock) {
            warn!(error = %e, "alert blink failed");
        }
        true
    }

    /// Clear the active flag and forget the last alert, re-arming immediately.
    pub fn reset_alert(&mut self) {
        self.active = false;
        self.last_alert = None;
    }

    /// Non-positive (or non-finite) values are ignored.
    pub fn set_cooldown(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.cfg.cooldown = Duration::from_secs_f64(seconds);
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cfg.cooldown
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_alert_time(&self) -> Option<Instant> {
        self.last_alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{BuzzerEvent, SpyBuzzer, SpyIndicators};
    use smartbin_traits::clock::test_clock::TestClock;

    #[test]
    fn fires_with_configured_beeps_and_blinks() {
        let mut mgr = AlertManager::new(AlertCfg::default());
        let mut buzzer = SpyBuzzer::default();
        let spy = SpyIndicators::default();
        let mut leds = StatusIndicator::new(spy.clone());
        let clock = TestClock::new();

        assert!(mgr.check_and_alert(85.0, 80.0, clock.now(), &mut buzzer, &mut leds, &clock));
        assert_eq!(buzzer.events(), vec![BuzzerEvent::Alert(3)]);
        assert_eq!(spy.times_lit(Led::Red), 5);
        assert!(mgr.is_active());
    }

    #[test]
    fn failing_outputs_do_not_suppress_the_alert() {
        let mut mgr = AlertManager::new(AlertCfg::default());
        let mut buzzer = SpyBuzzer::default();
        let spy = SpyIndicators::default();
        spy.set_failing(true);
        let mut leds = StatusIndicator::new(spy);
        let clock = TestClock::new();
        assert!(mgr.check_and_alert(95.0, 80.0, clock.now(), &mut buzzer, &mut leds, &clock));
        assert!(mgr.last_alert_time().is_some());
    }

    #[test]
    fn set_cooldown_ignores_non_positive() {
        let mut mgr = AlertManager::new(AlertCfg::default());
        mgr.set_cooldown(0.0);
        mgr.set_cooldown(-5.0);
        mgr.set_cooldown(f64::NAN);
        assert_eq!(mgr.cooldown(), Duration::from_secs(300));
        mgr.set_cooldown(1.5);
        assert_eq!(mgr.cooldown(), Duration::from_millis(1_500));
    }
}
