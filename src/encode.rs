//! Serialization of Content-Type values into wire-safe header text.

use crate::encoded_word;
use crate::grammar::{has_cr_or_lf, is_token_char};
use crate::params::ParameterStore;

/// Serializes a media type, subtype, and parameter store as a header value
/// body: `type "/" subtype *("; " name "=" value)` in store order.
///
/// `allow_unicode` permits raw non-ASCII text where the surrounding header
/// context accepts it; with it off, any value that cannot be carried in a
/// 7-bit header is emitted as a quoted MIME encoded word under the fallback
/// charset.
pub fn format_content_type(
    media_type: &str,
    sub_type: &str,
    params: &ParameterStore,
    allow_unicode: bool,
) -> String {
    let mut out = String::with_capacity(media_type.len() + sub_type.len() + 1);
    out.push_str(media_type);
    out.push('/');
    out.push_str(sub_type);

    for (name, value) in params.iter() {
        out.push_str("; ");
        encode_value(name, &mut out, allow_unicode);
        out.push('=');
        encode_value(value, &mut out, allow_unicode);
    }

    out
}

/// Per-value encoding decision, in order: pre-encoded values pass through
/// quoted; values safe for this context go out as a bare token or a quoted
/// string; everything else becomes a quoted encoded word.
fn encode_value(value: &str, out: &mut String, allow_unicode: bool) {
    if encoded_word::detect(value).is_some() {
        // Already encoded elsewhere, pass through verbatim.
        out.push('"');
        out.push_str(value);
        out.push('"');
    } else if (allow_unicode && !has_cr_or_lf(value)) || is_plain_ascii(value) {
        append_token_or_quoted(value, out, allow_unicode);
    } else {
        out.push('"');
        out.push_str(&encoded_word::encode_encoded_word(value));
        out.push('"');
    }
}

/// ASCII with no bare CR or LF; anything else needs the encoded-word path
/// when unicode is not allowed.
fn is_plain_ascii(value: &str) -> bool {
    value.bytes().all(|b| b < 0x80 && b != b'\r' && b != b'\n')
}

/// Emits the value as a bare token when the token grammar fits, otherwise as
/// a quoted string with `"` and `\` escaped. An empty value serializes as `""`.
fn append_token_or_quoted(value: &str, out: &mut String, allow_unicode: bool) {
    let fits_token = !value.is_empty()
        && value.chars().all(|c| is_token_char(c) || (allow_unicode && !c.is_ascii()));
    if fits_token {
        out.push_str(value);
    } else {
        out.push('"');
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
}
