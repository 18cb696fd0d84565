#![no_main]

use caloprof::input::parse_event_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed events must surface as errors, never panics
        let _ = parse_event_line(input);
    }
});
