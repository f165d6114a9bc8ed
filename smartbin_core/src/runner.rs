//! The cooperative control loop.
//!
//! Each tick runs, in order: lid channel, fill channel, tier LEDs, alert,
//! status snapshot plus one server poll, then the tick sleep. A stage that
//! fails is recorded in the report and the remaining stages still run.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use smartbin_traits::{Actuator, AssetStore, Buzzer, Clock, Indicators, Led, RangingPins};
use tracing::{debug, error, info, warn};

use crate::alert::AlertManager;
use crate::builder::ControlLoopBuilder;
use crate::config::{BinCfg, LoopCfg};
use crate::error::{Report, TickFault};
use crate::fill;
use crate::hw_error::{Device, drive};
use crate::indicator::StatusIndicator;
use crate::lid::{LidController, LidEvent};
use crate::network::LinkStatus;
use crate::probe::{Distance, DistanceProbe};
use crate::server::{ServeOutcome, StatusServer};
use crate::status::StatusTier;

const STARTUP_BLINKS: u32 = 3;
const STARTUP_BLINK_INTERVAL: Duration = Duration::from_millis(200);
const READY_BEEP: Duration = Duration::from_millis(200);

/// What one tick observed and did.
#[derive(Debug)]
pub struct TickReport {
    pub lid_distance: Distance,
    /// `None` when the lid stage faulted.
    pub lid: Option<LidEvent>,
    pub fill_distance: Distance,
    pub fill_pct: f64,
    pub tier: StatusTier,
    pub alerted: bool,
    pub served: ServeOutcome,
    pub faults: Vec<Report>,
}

/// Sensor-only reading used by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub lid_distance: Distance,
    pub fill_distance: Distance,
    pub fill_pct: f64,
    pub tier: StatusTier,
}

/// Totals returned once `run` exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub faults: u64,
}

pub struct ControlLoop {
    pub(crate) lid_probe: DistanceProbe<Box<dyn RangingPins>>,
    pub(crate) fill_probe: DistanceProbe<Box<dyn RangingPins>>,
    pub(crate) lid: LidController<Box<dyn Actuator>>,
    pub(crate) leds: StatusIndicator<Box<dyn Indicators>>,
    pub(crate) buzzer: Box<dyn Buzzer>,
    pub(crate) alerts: AlertManager,
    pub(crate) server: Option<StatusServer<Box<dyn AssetStore>>>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) bin: BinCfg,
    pub(crate) cfg: LoopCfg,
}

impl ControlLoop {
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::default()
    }

    pub fn lid(&self) -> &LidController<Box<dyn Actuator>> {
        &self.lid
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertManager {
        &mut self.alerts
    }

    pub fn server(&self) -> Option<&StatusServer<Box<dyn AssetStore>>> {
        self.server.as_ref()
    }

    pub fn bin_cfg(&self) -> &BinCfg {
        &self.bin
    }

    pub fn loop_cfg(&self) -> &LoopCfg {
        &self.cfg
    }

    /// Boot cues and server start.
    ///
    /// With a link the server is started and green blinks; a bind failure
    /// drops the server and the bin runs sensor-only. Without a link red
    /// blinks. Either way a ready beep follows. Returns the bound address.
    pub fn startup(&mut self, link: LinkStatus) -> Option<SocketAddr> {
        let mut bound = None;
        let cue = if link.is_connected() {
            if let Some(server) = self.server.as_mut() {
                match server.start() {
                    Ok(addr) => bound = Some(addr),
                    Err(e) => {
                        warn!(error = %e, "status server failed to start, running sensor-only");
                        self.server = None;
                    }
                }
            }
            Led::Green
        } else {
            self.server = None;
            Led::Red
        };
        if let Err(e) =
            self.leds
                .blink(cue, STARTUP_BLINKS, STARTUP_BLINK_INTERVAL, &*self.clock)
        {
            warn!(error = %e, "startup blink failed");
        }
        if let Err(e) = drive(Device::Buzzer, self.buzzer.beep(READY_BEEP)) {
            warn!(error = %e, "ready beep failed");
        }
        info!(server = ?bound, "smart bin ready");
        bound
    }

    /// Range both channels once without driving any output.
    pub fn sample(&mut self) -> Sample {
        let lid_distance = self.lid_probe.measure(&*self.clock);
        let fill_distance = self.fill_probe.measure(&*self.clock);
        let fill_pct = fill::estimate(fill_distance, self.bin.height_cm);
        Sample {
            lid_distance,
            fill_distance,
            fill_pct,
            tier: StatusTier::classify(
                fill_pct,
                self.bin.half_threshold,
                self.bin.full_threshold,
            ),
        }
    }

    /// One pass over every stage. Never fails; stage faults are collected.
    pub fn tick(&mut self) -> TickReport {
        let mut faults = Vec::new();

        let lid_distance = self.lid_probe.measure(&*self.clock);
        let now = self.clock.now();
        let lid = match self.lid.poll(lid_distance, now, &mut *self.buzzer) {
            Ok(ev) => Some(ev),
            Err(e) => {
                faults.push(e);
                None
            }
        };

        let fill_distance = self.fill_probe.measure(&*self.clock);
        let fill_pct = fill::estimate(fill_distance, self.bin.height_cm);

        let (half, full) = (self.bin.half_threshold, self.bin.full_threshold);
        let tier = match self.leds.update_status(fill_pct, half, full) {
            Ok(tier) => tier,
            Err(e) => {
                faults.push(e);
                StatusTier::classify(fill_pct, half, full)
            }
        };

        let alerted = self.alerts.check_and_alert(
            fill_pct,
            full,
            now,
            &mut *self.buzzer,
            &mut self.leds,
            &*self.clock,
        );

        let served = match self.server.as_mut() {
            Some(server) => {
                server.update_stats(fill_pct, self.lid.open_count(), tier);
                server.handle_request().unwrap_or_else(|e| {
                    faults.push(e);
                    ServeOutcome::Failed
                })
            }
            None => ServeOutcome::Idle,
        };

        debug!(
            lid_cm = lid_distance.cm(),
            fill_cm = fill_distance.cm(),
            fill_pct,
            %tier,
            ?lid,
            "tick"
        );

        TickReport {
            lid_distance,
            lid,
            fill_distance,
            fill_pct,
            tier,
            alerted,
            served,
            faults,
        }
    }

    /// Tick until `shutdown` is raised (or `max_ticks` ticks have run), then
    /// drain through `shutdown`.
    ///
    /// Drive faults are logged and the loop carries on at its normal pace;
    /// anything else additionally pauses for `fault_pause`.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) -> RunSummary {
        let mut summary = RunSummary::default();
        while !shutdown.load(Ordering::Relaxed) {
            if max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }
            let report = self.tick();
            summary.ticks += 1;

            let mut pause = self.cfg.tick;
            for fault in &report.faults {
                summary.faults += 1;
                match TickFault::classify(fault) {
                    TickFault::Drive => warn!(error = %fault, "drive fault, continuing"),
                    TickFault::Unclassified => {
                        error!(error = %fault, "tick fault, pausing");
                        pause = pause.max(self.cfg.fault_pause);
                    }
                }
            }
            self.clock.sleep(pause);
        }
        info!(ticks = summary.ticks, faults = summary.faults, "control loop stopped");
        self.shutdown();
        summary
    }

    /// Close the lid, release the servo, clear LEDs, silence the buzzer and
    /// stop the server. Every step is attempted even if an earlier one fails.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.lid.force_close() {
            warn!(error = %e, "could not close lid");
        }
        if let Err(e) = self.lid.release() {
            warn!(error = %e, "could not release servo");
        }
        if let Err(e) = self.leds.all_off() {
            warn!(error = %e, "could not clear indicators");
        }
        if let Err(e) = drive(Device::Buzzer, self.buzzer.silence()) {
            warn!(error = %e, "could not silence buzzer");
        }
        if let Some(server) = self.server.as_mut() {
            server.stop();
        }
        info!("shutdown complete");
    }
}
