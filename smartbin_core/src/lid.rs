//! Proximity-triggered lid with debounce and a minimum open dwell.
//!
//! The dwell is tracked as a deadline checked on every poll instead of a
//! blocking sleep, so the rest of the loop keeps running while the lid is
//! open. The lid stays open for at least `dwell` and no open trigger is
//! honoured while it is open.

use std::time::Instant;

use smartbin_traits::{Actuator, Buzzer};
use tracing::{info, warn};

use crate::config::LidCfg;
use crate::error::Result;
use crate::hw_error::{Device, drive};
use crate::probe::Distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidState {
    Closed,
    Open,
}

/// Open-transition bookkeeping; never reset while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuationHistory {
    pub last_trigger: Option<Instant>,
    pub open_count: u64,
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidEvent {
    /// Nothing in range, or no valid reading.
    Idle,
    /// Someone is in range but the last trigger was too recent.
    Debounced,
    Opened,
    /// Open and inside the dwell window.
    HeldOpen,
    Closed,
}

/// Servo positions for the lid.
pub struct Servo<A> {
    actuator: A,
    open_duty: u16,
    closed_duty: u16,
}

impl<A: Actuator> Servo<A> {
    pub fn new(actuator: A, open_duty: u16, closed_duty: u16) -> Self {
        Self {
            actuator,
            open_duty,
            closed_duty,
        }
    }

    pub fn open(&mut self) -> Result<()> {
        drive(Device::Actuator, self.actuator.set_duty(self.open_duty))
    }

    pub fn close(&mut self) -> Result<()> {
        drive(Device::Actuator, self.actuator.set_duty(self.closed_duty))
    }

    pub fn deinit(&mut self) -> Result<()> {
        drive(Device::Actuator, self.actuator.deinit())
    }
}

pub struct LidController<A> {
    servo: Servo<A>,
    cfg: LidCfg,
    state: LidState,
    open_until: Option<Instant>,
    history: ActuationHistory,
}

impl<A: Actuator> LidController<A> {
    /// Drives the servo closed so the recorded state matches the hardware.
    pub fn new(actuator: A, cfg: LidCfg) -> Result<Self> {
        let mut servo = Servo::new(actuator, cfg.open_duty, cfg.closed_duty);
        servo.close()?;
        Ok(Self {
            servo,
            cfg,
            state: LidState::Closed,
            open_until: None,
            history: ActuationHistory::default(),
        })
    }

    pub fn state(&self) -> LidState {
        self.state
    }

    pub fn history(&self) -> ActuationHistory {
        self.history
    }

    pub fn open_count(&self) -> u64 {
        self.history.open_count
    }

    /// Feed one proximity reading taken at `now`.
    ///
    /// A failed servo command propagates. The state is left as attempted
    /// since the physical position is unknown; an attempted open still
    /// closes once its dwell expires.
    pub fn poll(
        &mut self,
        distance: Distance,
        now: Instant,
        buzzer: &mut dyn Buzzer,
    ) -> Result<LidEvent> {
        if self.state == LidState::Open {
            return self.expire_dwell(now);
        }

        let in_range = matches!(
            distance.cm(),
            Some(cm) if cm > 0.0 && cm < self.cfg.trigger_distance_cm
        );
        if !in_range {
            return Ok(LidEvent::Idle);
        }
        if let Some(last) = self.history.last_trigger
            && now.saturating_duration_since(last) <= self.cfg.debounce
        {
            return Ok(LidEvent::Debounced);
        }

        self.state = LidState::Open;
        self.open_until = Some(now + self.cfg.dwell);
        self.history.last_trigger = Some(now);
        self.servo.open()?;
        self.history.open_count += 1;
        info!(
            distance_cm = distance.cm().unwrap_or_default(),
            open_count = self.history.open_count,
            "lid opened"
        );
        if let Err(e) = buzzer.beep(self.cfg.ack_beep) {
            warn!(error = %e, "acknowledgment beep failed");
        }
        Ok(LidEvent::Opened)
    }

    fn expire_dwell(&mut self, now: Instant) -> Result<LidEvent> {
        match self.open_until {
            Some(until) if now < until => Ok(LidEvent::HeldOpen),
            _ => {
                self.state = LidState::Closed;
                self.open_until = None;
                self.servo.close()?;
                info!("lid closed");
                Ok(LidEvent::Closed)
            }
        }
    }

    /// Close regardless of dwell; used on shutdown.
    pub fn force_close(&mut self) -> Result<()> {
        self.state = LidState::Closed;
        self.open_until = None;
        self.servo.close()
    }

    pub fn release(&mut self) -> Result<()> {
        self.servo.deinit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{BuzzerEvent, SpyActuator, SpyBuzzer};
    use std::time::Duration;

    fn controller(act: &SpyActuator, cfg: LidCfg) -> LidController<SpyActuator> {
        LidController::new(act.clone(), cfg).unwrap()
    }

    #[test]
    fn starts_closed_and_commands_closed_position() {
        let act = SpyActuator::default();
        let lid = controller(&act, LidCfg::default());
        assert_eq!(lid.state(), LidState::Closed);
        assert_eq!(act.duties(), vec![2_500]);
    }

    #[test]
    fn close_reading_opens_and_counts_once() {
        let act = SpyActuator::default();
        let buzzer = SpyBuzzer::default();
        let mut lid = controller(&act, LidCfg::default());
        let t0 = Instant::now();

        let ev = lid
            .poll(Distance::Valid(25.0), t0, &mut buzzer.clone())
            .unwrap();
        assert_eq!(ev, LidEvent::Opened);
        assert_eq!(lid.state(), LidState::Open);
        assert_eq!(lid.open_count(), 1);
        assert_eq!(act.last_duty(), Some(7_500));
        assert_eq!(
            buzzer.events(),
            vec![BuzzerEvent::Beep(Duration::from_millis(100))]
        );

        // one second later: still inside dwell, no new transition
        let ev = lid
            .poll(
                Distance::Valid(25.0),
                t0 + Duration::from_secs(1),
                &mut buzzer.clone(),
            )
            .unwrap();
        assert_eq!(ev, LidEvent::HeldOpen);
        assert_eq!(lid.open_count(), 1);
    }

    #[test]
    fn stays_open_for_dwell_then_closes_unconditionally() {
        let act = SpyActuator::default();
        let mut buzzer = SpyBuzzer::default();
        let mut lid = controller(&act, LidCfg::default());
        let t0 = Instant::now();
        lid.poll(Distance::Valid(10.0), t0, &mut buzzer).unwrap();

        let just_before = t0 + Duration::from_millis(4_999);
        assert_eq!(
            lid.poll(Distance::Invalid, just_before, &mut buzzer).unwrap(),
            LidEvent::HeldOpen
        );
        let at_deadline = t0 + Duration::from_secs(5);
        // a person still standing there does not keep it open
        assert_eq!(
            lid.poll(Distance::Valid(10.0), at_deadline, &mut buzzer)
                .unwrap(),
            LidEvent::Closed
        );
        assert_eq!(lid.state(), LidState::Closed);
        assert_eq!(act.last_duty(), Some(2_500));
    }

    #[test]
    fn debounce_suppresses_quick_retrigger() {
        let act = SpyActuator::default();
        let mut buzzer = SpyBuzzer::default();
        let cfg = LidCfg {
            dwell: Duration::from_millis(500),
            ..LidCfg::default()
        };
        let mut lid = controller(&act, cfg);
        let t0 = Instant::now();
        lid.poll(Distance::Valid(25.0), t0, &mut buzzer).unwrap();
        lid.poll(Distance::Invalid, t0 + Duration::from_millis(600), &mut buzzer)
            .unwrap();
        assert_eq!(lid.state(), LidState::Closed);

        let ev = lid
            .poll(Distance::Valid(25.0), t0 + Duration::from_secs(1), &mut buzzer)
            .unwrap();
        assert_eq!(ev, LidEvent::Debounced);
        // exactly at the debounce boundary is still suppressed
        let ev = lid
            .poll(Distance::Valid(25.0), t0 + Duration::from_secs(2), &mut buzzer)
            .unwrap();
        assert_eq!(ev, LidEvent::Debounced);
        let ev = lid
            .poll(
                Distance::Valid(25.0),
                t0 + Duration::from_millis(2_001),
                &mut buzzer,
            )
            .unwrap();
        assert_eq!(ev, LidEvent::Opened);
        assert_eq!(lid.open_count(), 2);
    }

    #[test]
    fn ignores_far_zero_and_invalid_readings() {
        let act = SpyActuator::default();
        let mut buzzer = SpyBuzzer::default();
        let mut lid = controller(&act, LidCfg::default());
        let now = Instant::now();
        for d in [
            Distance::Valid(30.0),
            Distance::Valid(120.0),
            Distance::Valid(0.0),
            Distance::Invalid,
        ] {
            assert_eq!(lid.poll(d, now, &mut buzzer).unwrap(), LidEvent::Idle);
        }
        assert_eq!(lid.open_count(), 0);
    }

    #[test]
    fn failed_open_leaves_state_as_attempted() {
        let act = SpyActuator::default();
        let mut buzzer = SpyBuzzer::default();
        let mut lid = controller(&act, LidCfg::default());
        act.set_failing(true);
        let t0 = Instant::now();
        assert!(lid.poll(Distance::Valid(5.0), t0, &mut buzzer).is_err());
        assert_eq!(lid.state(), LidState::Open);
        assert_eq!(lid.open_count(), 0);
        assert!(buzzer.events().is_empty());

        act.set_failing(false);
        let ev = lid
            .poll(Distance::Invalid, t0 + Duration::from_secs(5), &mut buzzer)
            .unwrap();
        assert_eq!(ev, LidEvent::Closed);
    }

    #[test]
    fn force_close_skips_dwell() {
        let act = SpyActuator::default();
        let mut buzzer = SpyBuzzer::default();
        let mut lid = controller(&act, LidCfg::default());
        lid.poll(Distance::Valid(5.0), Instant::now(), &mut buzzer)
            .unwrap();
        lid.force_close().unwrap();
        assert_eq!(lid.state(), LidState::Closed);
        assert_eq!(act.last_duty(), Some(2_500));
    }
}
