//! Assemble collaborators from config: GPIO with `--features hardware` on
//! Linux, simulated backends otherwise.

use smartbin_config::Config;
use smartbin_core::ControlLoopBuilder;
use smartbin_hardware::DirAssetStore;
use smartbin_traits::NetworkLink;

use crate::error_fmt::StartupError;

/// Fixed lid distance for the simulated ranger (cm); unset means nobody nearby.
pub const SIM_LID_ENV: &str = "SMARTBIN_SIM_LID_CM";
/// Fixed fill distance for the simulated ranger (cm); unset means an empty bin.
pub const SIM_FILL_ENV: &str = "SMARTBIN_SIM_FILL_CM";

pub struct Assembled {
    pub builder: ControlLoopBuilder,
    pub link: Box<dyn NetworkLink>,
}

/// Builder with every collaborator and config section applied. The status
/// server is attached when enabled, using `port` over the configured one.
pub fn assemble(cfg: &Config, port: Option<u16>) -> eyre::Result<Assembled> {
    let Assembled { builder, link } = backends(cfg)?;
    let mut builder = builder.with_config(cfg);
    if cfg.server.enabled {
        let mut server: smartbin_core::ServerCfg = (&cfg.server).into();
        if let Some(p) = port {
            server.port = p;
        }
        builder = builder.with_server(server, DirAssetStore::new(&cfg.server.assets_dir));
    }
    Ok(Assembled { builder, link })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn backends(cfg: &Config) -> eyre::Result<Assembled> {
    use smartbin_hardware::{
        SimulatedBuzzer, SimulatedIndicators, SimulatedLink, SimulatedRanging, SimulatedServo,
    };

    let lid_cm = sim_distance(SIM_LID_ENV)?;
    let fill_cm = sim_distance(SIM_FILL_ENV)?.or(Some(cfg.bin.height_cm));
    tracing::info!(?lid_cm, ?fill_cm, "using simulated hardware");

    let builder = ControlLoopBuilder::default()
        .with_lid_ranging(SimulatedRanging::new(lid_cm))
        .with_fill_ranging(SimulatedRanging::new(fill_cm))
        .with_actuator(SimulatedServo::new())
        .with_indicators(SimulatedIndicators::new())
        .with_buzzer(SimulatedBuzzer);
    Ok(Assembled {
        builder,
        link: Box::new(SimulatedLink::default()),
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn sim_distance(var: &str) -> eyre::Result<Option<f64>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|cm| cm.is_finite())
            .map(Some)
            .ok_or_else(|| {
                eyre::Report::new(StartupError::Config(format!(
                    "{var} must be a distance in cm, got {raw:?}"
                )))
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn backends(cfg: &Config) -> eyre::Result<Assembled> {
    use smartbin_hardware::HostLink;
    use smartbin_hardware::gpio::{self, GpioBuzzer, GpioIndicators, HcSr04, PwmServo};

    let hw = |what: &str, e: smartbin_hardware::error::HwError| {
        eyre::Report::new(StartupError::Hardware(format!("{what}: {e}")))
    };
    let p = &cfg.pins;
    let chip = gpio::open().map_err(|e| hw("open gpio", e))?;
    let lid = HcSr04::new(&chip, p.lid_trig, p.lid_echo).map_err(|e| hw("lid ranger", e))?;
    let fill = HcSr04::new(&chip, p.fill_trig, p.fill_echo).map_err(|e| hw("fill ranger", e))?;
    let servo = PwmServo::new(&chip, p.servo, cfg.servo.freq_hz).map_err(|e| hw("servo", e))?;
    let leds = GpioIndicators::new(&chip, p.led_green, p.led_yellow, p.led_red)
        .map_err(|e| hw("leds", e))?;
    let buzzer = GpioBuzzer::new(&chip, p.buzzer).map_err(|e| hw("buzzer", e))?;
    tracing::info!(pins = ?p, "gpio hardware ready");

    let builder = ControlLoopBuilder::default()
        .with_lid_ranging(lid)
        .with_fill_ranging(fill)
        .with_actuator(servo)
        .with_indicators(leds)
        .with_buzzer(buzzer);
    Ok(Assembled {
        builder,
        link: Box::new(HostLink::new()),
    })
}
