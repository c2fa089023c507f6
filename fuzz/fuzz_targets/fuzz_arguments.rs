//! Fuzz target for argument translation.
//!
//! Key names, scroll amounts, signals and sizes come straight from the user;
//! translating them must never panic, and every built request must render.

#![no_main]

use arbitrary::Arbitrary;
use kitctl::cli;
use kitctl::request::Request;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    key: String,
    amount: String,
    signal: String,
    size: String,
    marker: Vec<String>,
    pair: String,
}

fuzz_target!(|input: Input| {
    let key = cli::normalize_key(&input.key);
    let amount = cli::scroll_amount(&input.amount);
    let _ = cli::parse_signal(&input.signal);
    let _ = cli::parse_opacity(&input.size);
    let _ = cli::parse_key_value(&input.pair);

    if let Ok(size) = cli::parse_font_size(&input.size) {
        let _ = cli::font_size_arg(&size, true);
    }

    let requests = [
        Request::SendKey { matcher: None, keys: vec![key] },
        Request::ScrollWindow { matcher: None, amount },
    ];
    for request in &requests {
        assert_eq!(request.args()[0], request.name());
    }

    if let Ok(spec) = cli::marker_spec(&input.marker) {
        let request = Request::CreateMarker { matcher: None, spec };
        let _ = request.args();
    }
});
