#![no_main]

use content_type_rs::encoded_word;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Decoding arbitrary input must never panic
        let _ = encoded_word::decode_encoded_word(s);
        // Encoding then decoding must reproduce the input
        let word = encoded_word::encode_encoded_word(s);
        assert_eq!(encoded_word::decode_encoded_word(&word), s);
    }
});
