#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the bin controller.
//!
//! - `Config` and its sections are deserialized from TOML. Every section is
//!   optional and falls back to the stock firmware values.
//! - `Config::validate()` rejects values the control loop cannot honour.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Pins {
    pub lid_trig: u8,
    pub lid_echo: u8,
    pub fill_trig: u8,
    pub fill_echo: u8,
    pub servo: u8,
    pub led_green: u8,
    pub led_yellow: u8,
    pub led_red: u8,
    pub buzzer: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            lid_trig: 2,
            lid_echo: 3,
            fill_trig: 4,
            fill_echo: 5,
            servo: 15,
            led_green: 16,
            led_yellow: 17,
            led_red: 18,
            buzzer: 19,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BinCfg {
    /// Distance from the fill sensor to the bin floor.
    pub height_cm: f64,
    /// Fill percentage at which the warning tier starts.
    pub half_threshold: f64,
    /// Fill percentage at which the bin counts as full and alerts fire.
    pub full_threshold: f64,
}

impl Default for BinCfg {
    fn default() -> Self {
        Self {
            height_cm: 40.0,
            half_threshold: 50.0,
            full_threshold: 80.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Ranging {
    /// Abandon a ranging cycle after this many microseconds. Also accepts "sensor_timeout".
    #[serde(alias = "sensor_timeout")]
    pub timeout_us: u64,
    /// Echoes beyond this range are treated as invalid, not saturated.
    pub max_range_cm: f64,
}

impl Default for Ranging {
    fn default() -> Self {
        Self {
            timeout_us: 30_000,
            max_range_cm: 400.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LidCfg {
    pub trigger_distance_cm: f64,
    /// Minimum gap between two honoured open triggers.
    pub debounce_ms: u64,
    /// How long the lid stays open once triggered.
    pub dwell_ms: u64,
}

impl Default for LidCfg {
    fn default() -> Self {
        Self {
            trigger_distance_cm: 30.0,
            debounce_ms: 2_000,
            dwell_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServoCfg {
    pub freq_hz: u32,
    /// 16-bit duty for the closed position
    pub closed_duty: u16,
    /// 16-bit duty for the open position
    pub open_duty: u16,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            freq_hz: 50,
            closed_duty: 2_500,
            open_duty: 7_500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertCfg {
    /// Minimum seconds between two full-bin alerts.
    pub cooldown_s: u64,
    pub beeps: u32,
    pub blinks: u32,
    pub blink_interval_ms: u64,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            cooldown_s: 300,
            beeps: 3,
            blinks: 5,
            blink_interval_ms: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerCfg {
    pub enabled: bool,
    /// TCP port; 0 lets the OS choose.
    pub port: u16,
    pub read_timeout_ms: u64,
    pub max_request_bytes: usize,
    /// Directory holding the dashboard page.
    pub assets_dir: String,
    pub page: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 80,
            read_timeout_ms: 1_000,
            max_request_bytes: 1_024,
            assets_dir: "www".to_string(),
            page: "dashboard.html".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkCfg {
    /// Number of link polls before giving up.
    pub connect_polls: u32,
    pub poll_interval_ms: u64,
}

impl Default for NetworkCfg {
    fn default() -> Self {
        Self {
            connect_polls: 10,
            poll_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoopCfg {
    /// Cooperative sleep at the end of every tick.
    pub tick_ms: u64,
    /// Pause after a faulted tick before resuming.
    pub fault_pause_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            fault_pause_ms: 1_000,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub bin: BinCfg,
    pub ranging: Ranging,
    pub lid: LidCfg,
    pub servo: ServoCfg,
    pub alert: AlertCfg,
    pub server: ServerCfg,
    pub network: NetworkCfg,
    #[serde(rename = "loop")]
    pub run_loop: LoopCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Bin geometry and tiers
        if !(self.bin.height_cm.is_finite() && self.bin.height_cm > 0.0) {
            eyre::bail!("bin.height_cm must be > 0");
        }
        let pct_ok = |v: f64| v.is_finite() && v > 0.0 && v <= 100.0;
        if !pct_ok(self.bin.half_threshold) {
            eyre::bail!("bin.half_threshold must be in (0, 100]");
        }
        if !pct_ok(self.bin.full_threshold) {
            eyre::bail!("bin.full_threshold must be in (0, 100]");
        }
        if self.bin.half_threshold >= self.bin.full_threshold {
            eyre::bail!("bin.half_threshold must be < bin.full_threshold");
        }

        // Ranging
        if self.ranging.timeout_us == 0 {
            eyre::bail!("ranging.timeout_us must be >= 1");
        }
        if !(self.ranging.max_range_cm.is_finite() && self.ranging.max_range_cm > 0.0) {
            eyre::bail!("ranging.max_range_cm must be > 0");
        }

        // Lid
        if !(self.lid.trigger_distance_cm.is_finite() && self.lid.trigger_distance_cm > 0.0) {
            eyre::bail!("lid.trigger_distance_cm must be > 0");
        }
        if self.lid.dwell_ms == 0 {
            eyre::bail!("lid.dwell_ms must be >= 1");
        }
        if self.servo.freq_hz == 0 {
            eyre::bail!("servo.freq_hz must be > 0");
        }

        // Alert
        if self.alert.cooldown_s == 0 {
            eyre::bail!("alert.cooldown_s must be >= 1");
        }

        // Server
        if self.server.max_request_bytes == 0 {
            eyre::bail!("server.max_request_bytes must be >= 1");
        }
        if self.server.page.is_empty() {
            eyre::bail!("server.page must not be empty");
        }

        // Network
        if self.network.connect_polls == 0 {
            eyre::bail!("network.connect_polls must be >= 1");
        }

        // Loop
        if !(1..=1_000).contains(&self.run_loop.tick_ms) {
            eyre::bail!("loop.tick_ms must be in [1, 1000]");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
