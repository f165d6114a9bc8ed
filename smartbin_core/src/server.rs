//! Single-listener status responder polled once per loop tick.
//!
//! The listener is non-blocking, so `handle_request` returns at once when no
//! client is waiting. An accepted connection is served synchronously (one
//! bounded read, one response) and then closed. Connection faults are logged
//! and never surface to the caller.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use serde::{Serialize, Serializer};
use smartbin_traits::AssetStore;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::{debug, info, warn};

use crate::config::ServerCfg;
use crate::error::BinError;
use crate::http::{Method, RequestLine, Response, parse_request_line};
use crate::status::StatusTier;

const CLOCK_FMT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// When the bin was last marked emptied through the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastEmptied {
    Never,
    /// Wall-clock `HH:MM:SS`.
    At(String),
}

impl Serialize for LastEmptied {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            LastEmptied::Never => s.serialize_str("Never"),
            LastEmptied::At(t) => s.serialize_str(t),
        }
    }
}

/// JSON body of `/api/stats` and `/api/empty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub fill_percentage: f64,
    pub lid_openings: u64,
    pub last_emptied: LastEmptied,
    pub status: StatusTier,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            fill_percentage: 0.0,
            lid_openings: 0,
            last_emptied: LastEmptied::Never,
            status: StatusTier::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Page,
    Stats,
    Empty,
    NotFound,
}

impl Route {
    pub fn resolve(line: &RequestLine) -> Self {
        match (line.method, line.path.as_str()) {
            (Method::Get, "/") => Route::Page,
            (Method::Get, p) if p.starts_with("/index") => Route::Page,
            (Method::Get, "/api/stats") => Route::Stats,
            (Method::Post, "/api/empty") => Route::Empty,
            _ => Route::NotFound,
        }
    }
}

/// Result of one `handle_request` poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Not listening, or no connection pending.
    Idle,
    Served { route: Route, status: u16 },
    /// The connection broke while reading or writing; already logged.
    Failed,
}

pub struct StatusServer<A> {
    cfg: ServerCfg,
    assets: A,
    listener: Option<TcpListener>,
    snapshot: StatusSnapshot,
}

impl<A: AssetStore> StatusServer<A> {
    pub fn new(cfg: ServerCfg, assets: A) -> Self {
        Self {
            cfg,
            assets,
            listener: None,
            snapshot: StatusSnapshot::default(),
        }
    }

    /// Bind on all interfaces and switch the listener to non-blocking mode.
    pub fn start(&mut self) -> io::Result<SocketAddr> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, self.cfg.port))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        info!(%addr, "status server listening");
        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn stop(&mut self) {
        if self.listener.take().is_some() {
            info!("status server stopped");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    /// Refresh the sensor-driven fields; `last_emptied` is kept.
    pub fn update_stats(&mut self, fill_pct: f64, lid_openings: u64, status: StatusTier) {
        self.snapshot.fill_percentage = fill_pct;
        self.snapshot.lid_openings = lid_openings;
        self.snapshot.status = status;
    }

    /// Zero the reported fill and stamp the current local time.
    pub fn mark_emptied(&mut self) {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        self.mark_emptied_at(now);
    }

    pub fn mark_emptied_at(&mut self, at: OffsetDateTime) {
        let stamp = at.format(CLOCK_FMT).unwrap_or_else(|err| {
            warn!(error = %err, "failed to format emptied time");
            format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
        });
        self.snapshot.fill_percentage = 0.0;
        self.snapshot.last_emptied = LastEmptied::At(stamp);
        info!("bin marked emptied");
    }

    /// Serve at most one pending connection.
    /// A broken client connection is `Failed`; a listener that can no longer
    /// accept is an error.
    pub fn handle_request(&mut self) -> crate::error::Result<ServeOutcome> {
        let accepted = match self.listener.as_ref() {
            Some(listener) => listener.accept(),
            None => return Ok(ServeOutcome::Idle),
        };
        match accepted {
            Ok((stream, peer)) => match self.serve(stream) {
                Ok((route, status)) => {
                    debug!(%peer, ?route, status, "request served");
                    Ok(ServeOutcome::Served { route, status })
                }
                Err(e) => {
                    warn!(%peer, error = %e, "connection failed");
                    Ok(ServeOutcome::Failed)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ServeOutcome::Idle),
            Err(e) => Err(eyre::Report::new(BinError::Io(format!("accept: {e}")))),
        }
    }

    fn serve(&mut self, mut stream: TcpStream) -> io::Result<(Route, u16)> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.cfg.read_timeout))?;
        stream.set_write_timeout(Some(self.cfg.read_timeout))?;

        let mut buf = vec![0u8; self.cfg.max_request_bytes];
        let n = stream.read(&mut buf)?;
        let route = parse_request_line(&buf[..n])
            .map(|line| Route::resolve(&line))
            .unwrap_or(Route::NotFound);

        let response = self.respond(route);
        stream.write_all(&response.to_bytes())?;
        stream.flush()?;
        let _ = stream.shutdown(std::net::Shutdown::Both);
        Ok((route, response.status))
    }

    fn respond(&mut self, route: Route) -> Response {
        match route {
            Route::Page => match self.assets.fetch(&self.cfg.page) {
                Ok(body) => Response::html(body),
                Err(e) => {
                    debug!(page = %self.cfg.page, error = %e, "page unavailable");
                    Response::not_found(&format!("{} not found", self.cfg.page))
                }
            },
            Route::Stats => self.snapshot_json(),
            Route::Empty => {
                self.mark_emptied();
                self.snapshot_json()
            }
            Route::NotFound => Response::not_found("Not Found"),
        }
    }

    fn snapshot_json(&self) -> Response {
        match serde_json::to_vec(&self.snapshot) {
            Ok(body) => Response::json(body),
            Err(e) => {
                warn!(error = %e, "snapshot serialization failed");
                Response::internal_error("snapshot unavailable")
            }
        }
    }
}
