use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use smartbin_core::mocks::MemoryAssets;
use time::macros::datetime;

use smartbin_core::{LastEmptied, Route, ServeOutcome, ServerCfg, StatusServer, StatusTier};

const PAGE: &str = "<html><body>bin</body></html>";

fn started(assets: MemoryAssets) -> (StatusServer<MemoryAssets>, SocketAddr) {
    let cfg = ServerCfg {
        port: 0,
        ..ServerCfg::default()
    };
    let mut srv = StatusServer::new(cfg, assets);
    let addr = srv.start().expect("bind ephemeral port");
    (srv, addr)
}

/// Send `request`, poll the server until it serves, return outcome and raw response.
fn exchange(
    srv: &mut StatusServer<MemoryAssets>,
    addr: SocketAddr,
    request: &str,
) -> (ServeOutcome, String) {
    let mut client = TcpStream::connect(("127.0.0.1", addr.port())).expect("connect");
    client.write_all(request.as_bytes()).expect("send request");

    let mut outcome = ServeOutcome::Idle;
    for _ in 0..200 {
        outcome = srv.handle_request().expect("listener alive");
        if outcome != ServeOutcome::Idle {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    let mut response = String::new();
    client.read_to_string(&mut response).expect("read response");
    (outcome, response)
}

fn split(response: &str) -> (&str, &str) {
    response.split_once("\r\n\r\n").expect("header terminator")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|l| l.strip_prefix("Content-Length: "))
        .expect("content-length header")
        .parse()
        .expect("numeric length")
}

fn json(response: &str) -> serde_json::Value {
    serde_json::from_str(split(response).1).expect("json body")
}

#[test]
fn empty_then_stats_reports_zero_fill_and_timestamp() {
    let (mut srv, addr) = started(MemoryAssets::default());
    srv.update_stats(85.0, 7, StatusTier::Full);

    let (outcome, resp) = exchange(&mut srv, addr, "POST /api/empty HTTP/1.1\r\n\r\n");
    assert_eq!(
        outcome,
        ServeOutcome::Served {
            route: Route::Empty,
            status: 200
        }
    );
    assert_eq!(json(&resp)["fill_percentage"], 0.0);

    let (_, resp) = exchange(&mut srv, addr, "GET /api/stats HTTP/1.1\r\n\r\n");
    let body = json(&resp);
    assert_eq!(body["fill_percentage"], 0.0);
    assert_eq!(body["lid_openings"], 7);
    assert_ne!(body["last_emptied"], "Never");
    assert_eq!(body["status"], "FULL");
}

#[test]
fn mark_emptied_twice_restamps_and_zeroes() {
    let (mut srv, _) = started(MemoryAssets::default());
    srv.update_stats(91.0, 3, StatusTier::Full);
    srv.mark_emptied_at(datetime!(2024-05-01 08:15:00 UTC));
    assert_eq!(srv.snapshot().fill_percentage, 0.0);
    assert_eq!(srv.snapshot().last_emptied, LastEmptied::At("08:15:00".into()));

    srv.update_stats(64.0, 5, StatusTier::Warning);
    srv.mark_emptied_at(datetime!(2024-05-01 17:42:30 UTC));
    let second = serde_json::to_value(srv.snapshot()).unwrap();
    assert_eq!(second["fill_percentage"], 0.0);
    assert_eq!(second["last_emptied"], "17:42:30");
    assert_eq!(second["lid_openings"], 5);
}

#[test]
fn serves_page_with_exact_content_length() {
    let (mut srv, addr) = started(MemoryAssets::default().with("dashboard.html", PAGE));
    for path in ["/", "/index", "/index.html"] {
        let (outcome, resp) = exchange(&mut srv, addr, &format!("GET {path} HTTP/1.1\r\n\r\n"));
        assert_eq!(
            outcome,
            ServeOutcome::Served {
                route: Route::Page,
                status: 200
            }
        );
        let (head, body) = split(&resp);
        assert!(head.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html"));
        assert_eq!(body, PAGE);
        assert_eq!(content_length(head), body.len());
    }
}

#[test]
fn missing_page_is_404() {
    let (mut srv, addr) = started(MemoryAssets::default());
    let (_, resp) = exchange(&mut srv, addr, "GET / HTTP/1.1\r\n\r\n");
    let (head, body) = split(&resp);
    assert!(head.starts_with("HTTP/1.1 404 Not Found"));
    assert_eq!(body, "dashboard.html not found");
    assert_eq!(content_length(head), body.len());
}

#[test]
fn unknown_routes_and_methods_are_404() {
    let (mut srv, addr) = started(MemoryAssets::default());
    for req in [
        "GET /nope HTTP/1.1\r\n\r\n",
        "GET /api/empty HTTP/1.1\r\n\r\n",
        "PUT /api/stats HTTP/1.1\r\n\r\n",
        "garbage\r\n\r\n",
    ] {
        let (outcome, resp) = exchange(&mut srv, addr, req);
        assert_eq!(
            outcome,
            ServeOutcome::Served {
                route: Route::NotFound,
                status: 404
            }
        );
        assert!(resp.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }
}

#[test]
fn no_pending_client_returns_immediately() {
    let (mut srv, _) = started(MemoryAssets::default());
    assert_eq!(srv.handle_request().unwrap(), ServeOutcome::Idle);
}

#[test]
fn stop_closes_listener() {
    let (mut srv, _) = started(MemoryAssets::default());
    assert!(srv.is_listening());
    srv.stop();
    assert!(!srv.is_listening());
    assert_eq!(srv.local_addr(), None);
    assert_eq!(srv.handle_request().unwrap(), ServeOutcome::Idle);
}
