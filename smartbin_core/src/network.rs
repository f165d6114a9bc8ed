//! Bounded link bring-up before the loop starts.

use std::net::IpAddr;

use smartbin_traits::{Clock, NetworkLink};
use tracing::{info, warn};

use crate::config::NetworkCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected(Option<IpAddr>),
    Down,
}

impl LinkStatus {
    pub fn is_connected(self) -> bool {
        matches!(self, LinkStatus::Connected(_))
    }
}

/// Start connecting and poll the link up to `connect_polls` times,
/// sleeping `poll_interval` after each unsuccessful poll.
pub fn bring_up(link: &mut dyn NetworkLink, cfg: &NetworkCfg, clock: &dyn Clock) -> LinkStatus {
    if let Err(e) = link.connect() {
        warn!(error = %e, "network connect failed");
        return LinkStatus::Down;
    }
    for attempt in 1..=cfg.connect_polls {
        if link.is_connected() {
            let addr = link.address();
            info!(?addr, attempt, "network connected");
            return LinkStatus::Connected(addr);
        }
        clock.sleep(cfg.poll_interval);
    }
    warn!(
        polls = cfg.connect_polls,
        "network unavailable, continuing without status server"
    );
    LinkStatus::Down
}
