#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Control logic for the smart bin (hardware-agnostic).
//!
//! All hardware goes through the collaborator traits in `smartbin_traits`.
//!
//! ## Architecture
//!
//! - **Ranging**: one trigger/echo cycle per call, sanitized to `Distance` (`probe`)
//! - **Fill**: pure distance to percentage mapping (`fill`)
//! - **Lid**: debounced open with a non-blocking dwell deadline (`lid`)
//! - **Status**: tier classification and the tier LEDs (`status`, `indicator`)
//! - **Alerts**: cooldown-gated full-bin alert (`alert`)
//! - **Server**: non-blocking, one connection per tick status API (`server`, `http`)
//! - **Loop**: `ControlLoop` ties the above together (`runner`, `builder`)

pub mod alert;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod fill;
pub mod http;
pub mod hw_error;
pub mod indicator;
pub mod lid;
pub mod mocks;
pub mod network;
pub mod probe;
pub mod runner;
pub mod server;
pub mod status;
pub mod util;

pub use alert::AlertManager;
pub use builder::ControlLoopBuilder;
pub use config::{AlertCfg, BinCfg, LidCfg, LoopCfg, NetworkCfg, ProbeCfg, ServerCfg};
pub use error::{BinError, BuildError, Report, Result, TickFault};
pub use indicator::StatusIndicator;
pub use lid::{ActuationHistory, LidController, LidEvent, LidState};
pub use network::{LinkStatus, bring_up};
pub use probe::{Distance, DistanceProbe};
pub use runner::{ControlLoop, RunSummary, Sample, TickReport};
pub use server::{LastEmptied, Route, ServeOutcome, StatusServer, StatusSnapshot};
pub use status::StatusTier;
