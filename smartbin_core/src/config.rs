//! Runtime configuration for the control loop and its components.
//!
//! These are separate from the TOML-deserialized config in `smartbin_config`;
//! see `conversions` for the mapping. Defaults match the stock firmware.

use std::time::Duration;

/// Ultrasonic ranging limits.
#[derive(Debug, Clone)]
pub struct ProbeCfg {
    /// A ranging cycle is abandoned after this long.
    pub timeout: Duration,
    /// Echoes beyond this are invalid, not saturated.
    pub max_range_cm: f64,
}

impl Default for ProbeCfg {
    fn default() -> Self {
        Self {
            timeout: Duration::from_micros(30_000),
            max_range_cm: 400.0,
        }
    }
}

/// Bin geometry and fill tiers (percent).
#[derive(Debug, Clone)]
pub struct BinCfg {
    pub height_cm: f64,
    pub half_threshold: f64,
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

#[derive(Debug, Clone)]
pub struct LidCfg {
    /// Readings strictly below this open the lid.
    pub trigger_distance_cm: f64,
    pub debounce: Duration,
    pub dwell: Duration,
    pub open_duty: u16,
    pub closed_duty: u16,
    /// Acknowledgment beep on every honoured trigger.
    pub ack_beep: Duration,
}

impl Default for LidCfg {
    fn default() -> Self {
        Self {
            trigger_distance_cm: 30.0,
            debounce: Duration::from_secs(2),
            dwell: Duration::from_secs(5),
            open_duty: 7_500,
            closed_duty: 2_500,
            ack_beep: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertCfg {
    pub cooldown: Duration,
    pub beeps: u32,
    pub blinks: u32,
    pub blink_interval: Duration,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(300),
            beeps: 3,
            blinks: 5,
            blink_interval: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerCfg {
    pub port: u16,
    pub read_timeout: Duration,
    pub max_request_bytes: usize,
    /// Asset name of the dashboard page.
    pub page: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            port: 80,
            read_timeout: Duration::from_secs(1),
            max_request_bytes: 1_024,
            page: "dashboard.html".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkCfg {
    pub connect_polls: u32,
    pub poll_interval: Duration,
}

impl Default for NetworkCfg {
    fn default() -> Self {
        Self {
            connect_polls: 10,
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoopCfg {
    pub tick: Duration,
    pub fault_pause: Duration,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            fault_pause: Duration::from_secs(1),
        }
    }
}
