pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod util;

use smartbin_traits::{
    Actuator, AssetStore, Buzzer, HwResult, Indicators, Led, NetworkLink, RangingPins,
};
use std::cell::Cell;
use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Round-trip echo time per centimetre of range (2 / 0.0343 cm/us).
pub const ECHO_US_PER_CM: f64 = 58.2;

/// Simulated ultrasonic ranger returning a fixed, adjustable distance.
///
/// `None` simulates a missing echo (timeout).
pub struct SimulatedRanging {
    distance_cm: Rc<Cell<Option<f64>>>,
}

impl SimulatedRanging {
    pub fn new(distance_cm: Option<f64>) -> Self {
        SimulatedRanging {
            distance_cm: Rc::new(Cell::new(distance_cm)),
        }
    }

    /// Shared handle for moving the simulated target while the loop runs.
    pub fn handle(&self) -> Rc<Cell<Option<f64>>> {
        self.distance_cm.clone()
    }
}

impl RangingPins for SimulatedRanging {
    fn trigger_low(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn trigger_high(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn echo_high_us(&mut self, timeout: Duration) -> HwResult<i64> {
        let Some(cm) = self.distance_cm.get() else {
            return Ok(-1);
        };
        let us = (cm * ECHO_US_PER_CM).round() as i64;
        if us > timeout.as_micros() as i64 {
            return Ok(-1);
        }
        Ok(us)
    }
}

/// Simulated servo that remembers the last commanded duty.
#[derive(Default)]
pub struct SimulatedServo {
    duty: Rc<Cell<Option<u16>>>,
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self) -> Option<u16> {
        self.duty.get()
    }
}

impl Actuator for SimulatedServo {
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        tracing::debug!(duty, "servo duty (simulated)");
        self.duty.set(Some(duty));
        Ok(())
    }

    fn deinit(&mut self) -> HwResult<()> {
        tracing::debug!("servo released (simulated)");
        self.duty.set(None);
        Ok(())
    }
}

/// Simulated LED bank; state is only logged.
#[derive(Default)]
pub struct SimulatedIndicators {
    lit: [bool; 3],
}

impl SimulatedIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, led: Led) -> bool {
        self.lit[led_index(led)]
    }
}

fn led_index(led: Led) -> usize {
    match led {
        Led::Green => 0,
        Led::Yellow => 1,
        Led::Red => 2,
    }
}

impl Indicators for SimulatedIndicators {
    fn set(&mut self, led: Led, on: bool) -> HwResult<()> {
        let slot = &mut self.lit[led_index(led)];
        if *slot != on {
            tracing::trace!(?led, on, "led (simulated)");
        }
        *slot = on;
        Ok(())
    }
}

/// Simulated buzzer. Logs instead of sleeping so the loop stays responsive.
#[derive(Default)]
pub struct SimulatedBuzzer;

impl Buzzer for SimulatedBuzzer {
    fn beep(&mut self, duration: Duration) -> HwResult<()> {
        tracing::debug!(ms = duration.as_millis() as u64, "beep (simulated)");
        Ok(())
    }

    fn alert(&mut self, times: u32) -> HwResult<()> {
        tracing::debug!(times, "alert (simulated)");
        Ok(())
    }

    fn silence(&mut self) -> HwResult<()> {
        Ok(())
    }
}

/// Serves assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for DirAssetStore {
    fn fetch(&self, name: &str) -> io::Result<Vec<u8>> {
        // Plain file names only; anything that could climb out of root is absent.
        let rel = Path::new(name);
        let plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(io::Error::new(io::ErrorKind::NotFound, name.to_string()));
        }
        std::fs::read(self.root.join(rel))
    }
}

/// Link that is always up on the loopback address.
#[derive(Debug, Default)]
pub struct SimulatedLink {
    connected: bool,
}

impl NetworkLink for SimulatedLink {
    fn connect(&mut self) -> HwResult<()> {
        self.connected = true;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn address(&self) -> Option<IpAddr> {
        self.connected.then_some(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Link managed by the host OS. Connected once a default route exists;
/// the address is the local end of that route.
#[derive(Debug, Default)]
pub struct HostLink {
    address: Option<IpAddr>,
}

impl HostLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn probe_route() -> io::Result<IpAddr> {
        // connect() on UDP only selects a route; no packet is sent.
        let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        sock.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
        Ok(sock.local_addr()?.ip())
    }
}

impl NetworkLink for HostLink {
    fn connect(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        match Self::probe_route() {
            Ok(ip) if !ip.is_unspecified() => {
                self.address = Some(ip);
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::trace!(error = %e, "no route yet");
                false
            }
        }
    }

    fn address(&self) -> Option<IpAddr> {
        self.address
    }
}
