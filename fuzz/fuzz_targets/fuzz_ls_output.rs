//! Fuzz target for kitty output handling.
//!
//! Arbitrary `ls` documents and window text must not panic the parser, the
//! tree renderer or the error scanner.

#![no_main]

use chrono::{Local, TimeZone};
use kitctl::{model, summary, view};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(windows) = model::parse_ls(text) {
        let now = Local.timestamp_opt(0, 0).single().unwrap_or_else(Local::now);
        let _ = view::render_tree(&windows, now, None);
        let _ = view::listing_json(&windows);
    }

    let _ = summary::detect_errors(text);
    let _ = view::parse_colors(text);
    let _ = view::truncate(text, 25);
});
