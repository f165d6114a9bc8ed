#![no_main]
use libfuzzer_sys::fuzz_target;
use smartbin_core::server::Route;

fuzz_target!(|data: &[u8]| {
    // Whatever a client sends, the server must resolve a route without panicking.
    if let Some(line) = smartbin_core::http::parse_request_line(data) {
        let route = Route::resolve(&line);
        if route != Route::NotFound {
            assert!(line.path.starts_with('/'));
        }
    }
});
