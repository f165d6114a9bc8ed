//! Tier LEDs: exactly one lit for the current fill tier.

use std::time::Duration;

use smartbin_traits::{Clock, Indicators, Led};

use crate::error::Result;
use crate::hw_error::{Device, drive};
use crate::status::StatusTier;

pub struct StatusIndicator<I> {
    leds: I,
}

impl<I: Indicators> StatusIndicator<I> {
    pub fn new(leds: I) -> Self {
        Self { leds }
    }

    pub fn all_off(&mut self) -> Result<()> {
        for led in Led::ALL {
            drive(Device::Indicator, self.leds.set(led, false))?;
        }
        Ok(())
    }

    /// Switch everything off, then light the LED of the selected tier.
    pub fn update_status(&mut self, fill_pct: f64, half: f64, full: f64) -> Result<StatusTier> {
        let tier = StatusTier::classify(fill_pct, half, full);
        self.all_off()?;
        drive(Device::Indicator, self.leds.set(tier.led(), true))?;
        Ok(tier)
    }

    /// Blocking on/off sequence for boot and alert cues. Leaves `led` off.
    pub fn blink(
        &mut self,
        led: Led,
        count: u32,
        interval: Duration,
        clock: &dyn Clock,
    ) -> Result<()> {
        for _ in 0..count {
            drive(Device::Indicator, self.leds.set(led, true))?;
            clock.sleep(interval);
            drive(Device::Indicator, self.leds.set(led, false))?;
            clock.sleep(interval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BinError, TickFault};
    use crate::mocks::SpyIndicators;
    use rstest::rstest;
    use smartbin_traits::clock::test_clock::TestClock;

    #[rstest]
    #[case(90.0, Led::Red, StatusTier::Full)]
    #[case(60.0, Led::Yellow, StatusTier::Warning)]
    #[case(10.0, Led::Green, StatusTier::Normal)]
    fn exactly_one_led_for_tier(#[case] fill: f64, #[case] led: Led, #[case] tier: StatusTier) {
        let spy = SpyIndicators::default();
        let mut ind = StatusIndicator::new(spy.clone());
        // start from a different tier to prove the previous LED is cleared
        ind.update_status(100.0 - fill, 50.0, 80.0).unwrap();
        assert_eq!(ind.update_status(fill, 50.0, 80.0).unwrap(), tier);
        assert_eq!(spy.lit(), vec![led]);
    }

    #[test]
    fn blink_toggles_and_waits() {
        let spy = SpyIndicators::default();
        let clock = TestClock::new();
        let mut ind = StatusIndicator::new(spy.clone());
        ind.blink(Led::Green, 3, Duration::from_millis(200), &clock)
            .unwrap();
        assert_eq!(spy.times_lit(Led::Green), 3);
        assert!(!spy.is_lit(Led::Green));
        assert_eq!(clock.elapsed(), Duration::from_millis(1200));
    }

    #[test]
    fn driver_fault_is_an_indicator_fault() {
        let spy = SpyIndicators::default();
        spy.set_failing(true);
        let mut ind = StatusIndicator::new(spy);
        let err = ind.update_status(10.0, 50.0, 80.0).expect_err("driver offline");
        assert!(matches!(
            err.downcast_ref::<BinError>(),
            Some(BinError::Indicator(_))
        ));
        assert_eq!(TickFault::classify(&err), TickFault::Drive);
    }
}
