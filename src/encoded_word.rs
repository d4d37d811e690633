//! RFC 2047 encoded-word support for parameter values.
//!
//! Encoded words have the format `=?charset?encoding?encoded-text?=` with
//! `B` (base64, RFC 2045) or `Q` (quoted-printable variant, RFC 2047)
//! encoding. The Content-Type encoder falls back to an encoded word whenever
//! a parameter value cannot be carried in a 7-bit header as-is, and the
//! `name` accessor decodes stored encoded words for presentation.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Fallback charset used when the encoder must produce an encoded word.
pub const DEFAULT_CHARSET: &str = "utf-8";

const UPPER_HEX: &[u8] = b"0123456789ABCDEF";

/// Best-effort detection of an already-encoded value.
///
/// Returns the charset label when `value` has the shape of a single encoded
/// word: `=?charset?B|Q?text?=` with exactly five `?`-separated segments.
/// This is marker inspection, not validation; a legitimately quoted value
/// that happens to match the pattern is mis-detected as pre-encoded.
///
/// # Examples
///
/// ```
/// use content_type_rs::encoded_word::detect;
///
/// assert_eq!(detect("=?utf-8?B?SGVsbG8=?="), Some("utf-8"));
/// assert_eq!(detect("plain value"), None);
/// assert_eq!(detect("=?utf-8?X?SGVsbG8=?="), None);
/// ```
pub fn detect(value: &str) -> Option<&str> {
    if value.len() < 6 || !value.starts_with("=?") || !value.ends_with("?=") {
        return None;
    }
    let parts: Vec<&str> = value.split('?').collect();
    if parts.len() != 5 || parts[0] != "=" || parts[4] != "=" {
        return None;
    }
    let charset = parts[1];
    if charset.is_empty() {
        return None;
    }
    match parts[2] {
        "B" | "b" | "Q" | "q" => Some(charset),
        _ => None,
    }
}

/// Decodes a single RFC 2047 encoded word.
///
/// Input that is not a well-formed encoded word, or that fails to decode, is
/// returned unchanged; decoding is a presentation convenience and never an
/// error path.
///
/// # Examples
///
/// ```
/// use content_type_rs::encoded_word::decode_encoded_word;
///
/// assert_eq!(decode_encoded_word("=?utf-8?B?SGVsbG8gV29ybGQ=?="), "Hello World");
/// assert_eq!(decode_encoded_word("=?iso-8859-1?Q?Caf=E9?="), "Café");
/// assert_eq!(decode_encoded_word("not encoded"), "not encoded");
/// ```
pub fn decode_encoded_word(value: &str) -> String {
    let Some(charset) = detect(value) else {
        return value.to_string();
    };
    let parts: Vec<&str> = value.split('?').collect();
    let encoding = parts[2];
    let text = parts[3];

    let decoded = match encoding {
        "B" | "b" => BASE64.decode(text).ok(),
        _ => Some(decode_q(text)),
    };
    match decoded {
        Some(bytes) => charset_to_string(&bytes, charset),
        None => value.to_string(),
    }
}

/// Encodes a value as a single encoded word under the fallback charset.
///
/// Picks B or Q encoding by whichever projected output is shorter, so long
/// non-ASCII runs go to base64 while mostly-ASCII values stay readable.
/// [`decode_encoded_word`] reproduces the input exactly.
pub fn encode_encoded_word(value: &str) -> String {
    let bytes = value.as_bytes();
    if should_use_base64(bytes) {
        format!("=?{}?B?{}?=", DEFAULT_CHARSET, BASE64.encode(bytes))
    } else {
        format!("=?{}?Q?{}?=", DEFAULT_CHARSET, q_encode(bytes))
    }
}

/// Compares the projected Q-encoded length against base64.
fn should_use_base64(bytes: &[u8]) -> bool {
    let escaped = bytes.iter().filter(|&&b| q_needs_escape(b)).count();
    let q_len = bytes.len() + 2 * escaped;
    let b_len = (bytes.len() + 2) / 3 * 4;
    b_len < q_len
}

fn q_needs_escape(b: u8) -> bool {
    !(b.is_ascii_alphanumeric() || b == b' ' || matches!(b, b'!' | b'*' | b'+' | b'-' | b'/'))
}

fn q_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b == b' ' {
            out.push('_');
        } else if q_needs_escape(b) {
            out.push('=');
            out.push(UPPER_HEX[(b >> 4) as usize] as char);
            out.push(UPPER_HEX[(b & 0x0F) as usize] as char);
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Decodes Q-encoded text: underscores are spaces, `=XX` hex escapes carry
/// arbitrary bytes, malformed escapes pass through verbatim.
fn decode_q(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'_' => out.push(b' '),
            b'=' => {
                let hi = bytes.next();
                let lo = bytes.next();
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        let hex = [h, l];
                        match u8::from_str_radix(std::str::from_utf8(&hex).unwrap_or(""), 16) {
                            Ok(byte) => out.push(byte),
                            Err(_) => {
                                out.push(b'=');
                                out.push(h);
                                out.push(l);
                            }
                        }
                    }
                    _ => out.push(b'='),
                }
            }
            _ => out.push(b),
        }
    }
    out
}

/// Converts decoded bytes to a string under the named charset.
///
/// utf-8 and iso-8859-1 are handled exactly; anything else decodes lossily.
fn charset_to_string(bytes: &[u8], charset: &str) -> String {
    let charset = charset.to_ascii_lowercase();
    match charset.as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin1" | "us-ascii" => bytes.iter().map(|&b| b as char).collect(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}
