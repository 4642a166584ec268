//! Fuzz target for column profiling.
//!
//! Feeds arbitrary values through the name rules, number and date parsing,
//! and the narrative builder.

#![no_main]

use inquest::profile::ColumnAnalyzer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let values: Vec<&str> = content.split('\n').collect();
        let analyzer = ColumnAnalyzer::new();
        for name in ["value", "order_date", "year", "revenue"] {
            let _ = analyzer.analyze_column(name, &values);
        }
    }
});
