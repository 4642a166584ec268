//! Fuzz target for parsing text-generation responses.

#![no_main]

use inquest::generation::ResponseParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }

    if let Ok(response) = std::str::from_utf8(data) {
        let _ = ResponseParser::new().parse(response);
    }
});
