#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Period text arrives as arbitrary user input
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(periods) = hestia::schedule::parse_period_triples(text) {
            // Accepted input must survive the editing round trip
            let rendered = hestia::schedule::format_period_triples(&periods);
            let reparsed = hestia::schedule::parse_period_triples(&rendered)
                .unwrap_or_else(|_| panic!("rendered periods failed to reparse"));
            assert_eq!(periods, reparsed);
        }
    }
});
