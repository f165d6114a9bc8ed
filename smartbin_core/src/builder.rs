//! Builder for `ControlLoop`.
//!
//! Collaborators are boxed so the CLI can mix simulated and GPIO backends.
//! `try_build()` reports the first missing collaborator as a `BuildError`.

use smartbin_traits::clock::{Clock, MonotonicClock};
use smartbin_traits::{Actuator, AssetStore, Buzzer, Indicators, RangingPins};

use crate::alert::AlertManager;
use crate::config::{AlertCfg, BinCfg, LidCfg, LoopCfg, ProbeCfg, ServerCfg};
use crate::error::{BuildError, Result};
use crate::indicator::StatusIndicator;
use crate::lid::LidController;
use crate::probe::DistanceProbe;
use crate::runner::ControlLoop;
use crate::server::StatusServer;

#[derive(Default)]
pub struct ControlLoopBuilder {
    lid_ranging: Option<Box<dyn RangingPins>>,
    fill_ranging: Option<Box<dyn RangingPins>>,
    actuator: Option<Box<dyn Actuator>>,
    indicators: Option<Box<dyn Indicators>>,
    buzzer: Option<Box<dyn Buzzer>>,
    server: Option<(ServerCfg, Box<dyn AssetStore>)>,
    clock: Option<Box<dyn Clock>>,
    probe: Option<ProbeCfg>,
    bin: Option<BinCfg>,
    lid: Option<LidCfg>,
    alert: Option<AlertCfg>,
    run_loop: Option<LoopCfg>,
}

impl ControlLoopBuilder {
    pub fn with_lid_ranging(mut self, pins: impl RangingPins + 'static) -> Self {
        self.lid_ranging = Some(Box::new(pins));
        self
    }

    pub fn with_fill_ranging(mut self, pins: impl RangingPins + 'static) -> Self {
        self.fill_ranging = Some(Box::new(pins));
        self
    }

    pub fn with_actuator(mut self, actuator: impl Actuator + 'static) -> Self {
        self.actuator = Some(Box::new(actuator));
        self
    }

    pub fn with_indicators(mut self, leds: impl Indicators + 'static) -> Self {
        self.indicators = Some(Box::new(leds));
        self
    }

    pub fn with_buzzer(mut self, buzzer: impl Buzzer + 'static) -> Self {
        self.buzzer = Some(Box::new(buzzer));
        self
    }

    /// Enable the status server. It is only started by `ControlLoop::startup`.
    pub fn with_server(mut self, cfg: ServerCfg, assets: impl AssetStore + 'static) -> Self {
        self.server = Some((cfg, Box::new(assets)));
        self
    }

    /// Defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_probe(mut self, probe: ProbeCfg) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_bin(mut self, bin: BinCfg) -> Self {
        self.bin = Some(bin);
        self
    }

    pub fn with_lid(mut self, lid: LidCfg) -> Self {
        self.lid = Some(lid);
        self
    }

    pub fn with_alert(mut self, alert: AlertCfg) -> Self {
        self.alert = Some(alert);
        self
    }

    pub fn with_loop(mut self, run_loop: LoopCfg) -> Self {
        self.run_loop = Some(run_loop);
        self
    }

    /// Apply every runtime section derived from a loaded config file.
    /// The server section is left to `with_server`, which also needs assets.
    pub fn with_config(self, cfg: &smartbin_config::Config) -> Self {
        self.with_probe((&cfg.ranging).into())
            .with_bin((&cfg.bin).into())
            .with_lid(cfg.into())
            .with_alert((&cfg.alert).into())
            .with_loop((&cfg.run_loop).into())
    }

    /// Validate and assemble. Commands the lid closed, so this can fail on
    /// an actuator fault as well as on missing parts.
    pub fn try_build(self) -> Result<ControlLoop> {
        let lid_ranging = self
            .lid_ranging
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLidRanging))?;
        let fill_ranging = self
            .fill_ranging
            .ok_or_else(|| eyre::Report::new(BuildError::MissingFillRanging))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let indicators = self
            .indicators
            .ok_or_else(|| eyre::Report::new(BuildError::MissingIndicators))?;
        let buzzer = self
            .buzzer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBuzzer))?;

        let bin = self.bin.unwrap_or_default();
        if !(bin.height_cm.is_finite() && bin.height_cm > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "bin height must be > 0",
            )));
        }
        if bin.half_threshold >= bin.full_threshold {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "half threshold must be below full threshold",
            )));
        }
        let run_loop = self.run_loop.unwrap_or_default();
        if run_loop.tick.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "tick must be non-zero",
            )));
        }
        let probe = self.probe.unwrap_or_default();

        Ok(ControlLoop {
            lid_probe: DistanceProbe::new(lid_ranging, probe.clone()),
            fill_probe: DistanceProbe::new(fill_ranging, probe),
            lid: LidController::new(actuator, self.lid.unwrap_or_default())?,
            leds: StatusIndicator::new(indicators),
            buzzer,
            alerts: AlertManager::new(self.alert.unwrap_or_default()),
            server: self
                .server
                .map(|(cfg, assets)| StatusServer::new(cfg, assets)),
            clock: self
                .clock
                .unwrap_or_else(|| Box::new(MonotonicClock::new())),
            bin,
            cfg: run_loop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ScriptedRanging, SpyActuator, SpyBuzzer, SpyIndicators};

    fn complete() -> ControlLoopBuilder {
        ControlLoop::builder()
            .with_lid_ranging(ScriptedRanging::default())
            .with_fill_ranging(ScriptedRanging::default())
            .with_actuator(SpyActuator::default())
            .with_indicators(SpyIndicators::default())
            .with_buzzer(SpyBuzzer::default())
    }

    #[test]
    fn config_file_sections_flow_into_runtime() {
        let file = smartbin_config::load_toml("[bin]\nheight_cm = 60\n[loop]\ntick_ms = 250\n")
            .unwrap();
        let cl = complete().with_config(&file).try_build().unwrap();
        assert_eq!(cl.bin_cfg().height_cm, 60.0);
        assert_eq!(cl.loop_cfg().tick.as_millis(), 250);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = complete()
            .with_bin(BinCfg {
                half_threshold: 90.0,
                ..BinCfg::default()
            })
            .try_build()
            .err()
            .expect("must fail");
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        ));
    }
}
