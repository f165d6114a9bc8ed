//! Collaborator seams between the bin controller and the outside world.
//!
//! Every trait returns boxed errors so that simulated, GPIO and test backends
//! can report faults in their own types; `smartbin_core` maps them to its
//! typed taxonomy.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::net::IpAddr;
use std::time::Duration;

pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Trigger/echo pin pair of an ultrasonic ranger.
pub trait RangingPins {
    fn trigger_low(&mut self) -> HwResult<()>;
    fn trigger_high(&mut self) -> HwResult<()>;
    /// Microseconds the echo line stayed high. Negative when `timeout`
    /// elapsed before a complete pulse was seen.
    fn echo_high_us(&mut self, timeout: Duration) -> HwResult<i64>;
}

/// Position actuator driven by a 16-bit duty value (servo on a PWM line).
pub trait Actuator {
    fn set_duty(&mut self, duty: u16) -> HwResult<()>;
    /// Release the output so the actuator stops drawing holding current.
    fn deinit(&mut self) -> HwResult<()>;
}

/// The three tier indicators on the bin front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    Green,
    Yellow,
    Red,
}

impl Led {
    pub const ALL: [Led; 3] = [Led::Green, Led::Yellow, Led::Red];
}

pub trait Indicators {
    fn set(&mut self, led: Led, on: bool) -> HwResult<()>;
}

pub trait Buzzer {
    fn beep(&mut self, duration: Duration) -> HwResult<()>;
    /// `times` short beeps separated by short pauses.
    fn alert(&mut self, times: u32) -> HwResult<()>;
    fn silence(&mut self) -> HwResult<()>;
}

/// Read-only store for the dashboard page and friends.
pub trait AssetStore {
    /// Fails with `ErrorKind::NotFound` when `name` is not available.
    fn fetch(&self, name: &str) -> std::io::Result<Vec<u8>>;
}

/// Network association handled outside the controller (Wi-Fi, ethernet).
pub trait NetworkLink {
    /// Begin connecting. Returns once the attempt is underway.
    fn connect(&mut self) -> HwResult<()>;
    fn is_connected(&mut self) -> bool;
    fn address(&self) -> Option<IpAddr>;
}

impl<T: RangingPins + ?Sized> RangingPins for Box<T> {
    fn trigger_low(&mut self) -> HwResult<()> {
        (**self).trigger_low()
    }
    fn trigger_high(&mut self) -> HwResult<()> {
        (**self).trigger_high()
    }
    fn echo_high_us(&mut self, timeout: Duration) -> HwResult<i64> {
        (**self).echo_high_us(timeout)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        (**self).set_duty(duty)
    }
    fn deinit(&mut self) -> HwResult<()> {
        (**self).deinit()
    }
}

impl<T: Indicators + ?Sized> Indicators for Box<T> {
    fn set(&mut self, led: Led, on: bool) -> HwResult<()> {
        (**self).set(led, on)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for Box<T> {
    fn beep(&mut self, duration: Duration) -> HwResult<()> {
        (**self).beep(duration)
    }
    fn alert(&mut self, times: u32) -> HwResult<()> {
        (**self).alert(times)
    }
    fn silence(&mut self) -> HwResult<()> {
        (**self).silence()
    }
}

impl<T: AssetStore + ?Sized> AssetStore for Box<T> {
    fn fetch(&self, name: &str) -> std::io::Result<Vec<u8>> {
        (**self).fetch(name)
    }
}
