//! Recording doubles for the collaborator traits.
//!
//! Each double is a cheap `Clone` over shared state, so a test can hand one
//! copy to the code under test and keep another to script or inspect it.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::rc::Rc;
use std::time::Duration;

use smartbin_traits::{
    Actuator, AssetStore, Buzzer, HwResult, Indicators, Led, NetworkLink, RangingPins,
};

const ECHO_US_PER_CM: f64 = 58.2;

fn cm_to_echo_us(cm: f64) -> i64 {
    (cm * ECHO_US_PER_CM).round() as i64
}

#[derive(Default)]
struct RangingState {
    queue: VecDeque<i64>,
    sticky: Option<i64>,
    fail_next: bool,
    triggers: u32,
}

/// Ranger replaying queued echo times, then a sticky value (timeout if unset).
#[derive(Clone, Default)]
pub struct ScriptedRanging(Rc<RefCell<RangingState>>);

impl ScriptedRanging {
    pub fn push_echo_us(&self, us: i64) {
        self.0.borrow_mut().queue.push_back(us);
    }

    pub fn push_cm(&self, cm: f64) {
        self.push_echo_us(cm_to_echo_us(cm));
    }

    /// Reading returned once the queue is drained; `None` simulates no echo.
    pub fn set_cm(&self, cm: Option<f64>) {
        self.0.borrow_mut().sticky = cm.map(cm_to_echo_us);
    }

    pub fn fail_next(&self) {
        self.0.borrow_mut().fail_next = true;
    }

    pub fn triggers(&self) -> u32 {
        self.0.borrow().triggers
    }
}

impl RangingPins for ScriptedRanging {
    fn trigger_low(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn trigger_high(&mut self) -> HwResult<()> {
        self.0.borrow_mut().triggers += 1;
        Ok(())
    }

    fn echo_high_us(&mut self, _timeout: Duration) -> HwResult<i64> {
        let mut s = self.0.borrow_mut();
        if std::mem::take(&mut s.fail_next) {
            return Err("echo line unreadable".into());
        }
        Ok(s.queue.pop_front().or(s.sticky).unwrap_or(-1))
    }
}

#[derive(Default)]
struct ActuatorState {
    duties: Vec<u16>,
    failing: bool,
    released: bool,
}

#[derive(Clone, Default)]
pub struct SpyActuator(Rc<RefCell<ActuatorState>>);

impl SpyActuator {
    pub fn duties(&self) -> Vec<u16> {
        self.0.borrow().duties.clone()
    }

    pub fn last_duty(&self) -> Option<u16> {
        self.0.borrow().duties.last().copied()
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }

    pub fn released(&self) -> bool {
        self.0.borrow().released
    }
}

impl Actuator for SpyActuator {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let mut s = self.0.borrow_mut();
        if s.failing {
            return Err("servo stalled".into());
        }
        s.duties.push(duty);
        s.released = false;
        Ok(())
    }

    fn deinit(&mut self) -> HwResult<()> {
        self.0.borrow_mut().released = true;
        Ok(())
    }
}

#[derive(Default)]
struct IndicatorState {
    lit: [bool; 3],
    history: Vec<(Led, bool)>,
    failing: bool,
}

#[derive(Clone, Default)]
pub struct SpyIndicators(Rc<RefCell<IndicatorState>>);

fn slot(led: Led) -> usize {
    match led {
        Led::Green => 0,
        Led::Yellow => 1,
        Led::Red => 2,
    }
}

impl SpyIndicators {
    pub fn is_lit(&self, led: Led) -> bool {
        self.0.borrow().lit[slot(led)]
    }

    /// LEDs currently on, in `Led::ALL` order.
    pub fn lit(&self) -> Vec<Led> {
        Led::ALL.into_iter().filter(|l| self.is_lit(*l)).collect()
    }

    /// Number of times `led` was switched on.
    pub fn times_lit(&self, led: Led) -> usize {
        self.0
            .borrow()
            .history
            .iter()
            .filter(|(l, on)| *l == led && *on)
            .count()
    }

    pub fn set_failing(&self, failing: bool) {
        self.0.borrow_mut().failing = failing;
    }
}

impl Indicators for SpyIndicators {
    fn set(&mut self, led: Led, on: bool) -> HwResult<()> {
        let mut s = self.0.borrow_mut();
        if s.failing {
            return Err("led driver offline".into());
        }
        s.lit[slot(led)] = on;
        s.history.push((led, on));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerEvent {
    Beep(Duration),
    Alert(u32),
    Silence,
}

#[derive(Clone, Default)]
pub struct SpyBuzzer(Rc<RefCell<Vec<BuzzerEvent>>>);

impl SpyBuzzer {
    pub fn events(&self) -> Vec<BuzzerEvent> {
        self.0.borrow().clone()
    }
}

impl Buzzer for SpyBuzzer {
    fn beep(&mut self, duration: Duration) -> HwResult<()> {
        self.0.borrow_mut().push(BuzzerEvent::Beep(duration));
        Ok(())
    }

    fn alert(&mut self, times: u32) -> HwResult<()> {
        self.0.borrow_mut().push(BuzzerEvent::Alert(times));
        Ok(())
    }

    fn silence(&mut self) -> HwResult<()> {
        self.0.borrow_mut().push(BuzzerEvent::Silence);
        Ok(())
    }
}

/// In-memory asset store.
#[derive(Clone, Default)]
pub struct MemoryAssets(HashMap<String, Vec<u8>>);

impl MemoryAssets {
    pub fn with(mut self, name: &str, body: &str) -> Self {
        self.0.insert(name.to_string(), body.as_bytes().to_vec());
        self
    }
}

impl AssetStore for MemoryAssets {
    fn fetch(&self, name: &str) -> io::Result<Vec<u8>> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}

/// Link that comes up after a fixed number of polls (`None`: never).
#[derive(Debug, Clone)]
pub struct ScriptedLink {
    up_after: Option<u32>,
    polls: u32,
    connect_calls: u32,
}

impl ScriptedLink {
    pub fn up_after(polls: u32) -> Self {
        Self {
            up_after: Some(polls),
            polls: 0,
            connect_calls: 0,
        }
    }

    pub fn never() -> Self {
        Self {
            up_after: None,
            polls: 0,
            connect_calls: 0,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls
    }
}

impl NetworkLink for ScriptedLink {
    fn connect(&mut self) -> HwResult<()> {
        self.connect_calls += 1;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        let up = matches!(self.up_after, Some(n) if self.polls >= n);
        self.polls += 1;
        up
    }

    fn address(&self) -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42)))
    }
}
