#![no_main]

use content_type_rs::ContentType;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing must never panic; a successful parse must re-serialize
        if let Ok(mut value) = ContentType::parse(s) {
            let _ = value.header_value();
        }
    }
});
