//! `From` implementations bridging `smartbin_config` types to `smartbin_core` types.

use std::time::Duration;

use crate::config::{AlertCfg, BinCfg, LidCfg, LoopCfg, NetworkCfg, ProbeCfg, ServerCfg};

// ── ProbeCfg ─────────────────────────────────────────────────────────────────

impl From<&smartbin_config::Ranging> for ProbeCfg {
    fn from(c: &smartbin_config::Ranging) -> Self {
        Self {
            timeout: Duration::from_micros(c.timeout_us),
            max_range_cm: c.max_range_cm,
        }
    }
}

// ── BinCfg ───────────────────────────────────────────────────────────────────

impl From<&smartbin_config::BinCfg> for BinCfg {
    fn from(c: &smartbin_config::BinCfg) -> Self {
        Self {
            height_cm: c.height_cm,
            half_threshold: c.half_threshold,
            full_threshold: c.full_threshold,
        }
    }
}

// ── LidCfg ───────────────────────────────────────────────────────────────────

impl From<&smartbin_config::Config> for LidCfg {
    fn from(c: &smartbin_config::Config) -> Self {
        Self {
            trigger_distance_cm: c.lid.trigger_distance_cm,
            debounce: Duration::from_millis(c.lid.debounce_ms),
            dwell: Duration::from_millis(c.lid.dwell_ms),
            open_duty: c.servo.open_duty,
            closed_duty: c.servo.closed_duty,
            ..Self::default()
        }
    }
}

// ── AlertCfg ─────────────────────────────────────────────────────────────────

impl From<&smartbin_config::AlertCfg> for AlertCfg {
    fn from(c: &smartbin_config::AlertCfg) -> Self {
        Self {
            cooldown: Duration::from_secs(c.cooldown_s),
            beeps: c.beeps,
            blinks: c.blinks,
            blink_interval: Duration::from_millis(c.blink_interval_ms),
        }
    }
}

// ── ServerCfg ────────────────────────────────────────────────────────────────

impl From<&smartbin_config::ServerCfg> for ServerCfg {
    fn from(c: &smartbin_config::ServerCfg) -> Self {
        Self {
            port: c.port,
            read_timeout: Duration::from_millis(c.read_timeout_ms),
            max_request_bytes: c.max_request_bytes,
            page: c.page.clone(),
        }
    }
}

// ── NetworkCfg / LoopCfg ─────────────────────────────────────────────────────

impl From<&smartbin_config::NetworkCfg> for NetworkCfg {
    fn from(c: &smartbin_config::NetworkCfg) -> Self {
        Self {
            connect_polls: c.connect_polls,
            poll_interval: Duration::from_millis(c.poll_interval_ms),
        }
    }
}

impl From<&smartbin_config::LoopCfg> for LoopCfg {
    fn from(c: &smartbin_config::LoopCfg) -> Self {
        Self {
            tick: Duration::from_millis(c.tick_ms),
            fault_pause: Duration::from_millis(c.fault_pause_ms),
        }
    }
}
