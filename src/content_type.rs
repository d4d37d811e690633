//! Typed model of a Content-Type header value.
//!
//! The value is parsed during construction and on `set_raw`. Mutating any
//! component marks the model changed; `header_value` caches its serialization
//! and only recomputes while the model is changed. Persistence to the
//! surrounding header storage is tracked separately from the change flag,
//! since a freshly serialized value may still be unwritten.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::encode::format_content_type;
use crate::encoded_word;
use crate::error::{Error, Result};
use crate::grammar;
use crate::params::ParameterStore;

/// Default content type, used when the Content-Type header is not defined in
/// the message headers.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Name of the header this model serializes into.
pub const CONTENT_TYPE: &str = "Content-Type";

/// External header storage that receives the serialized Content-Type value.
///
/// The model never does IO itself; [`ContentType::persist_if_needed`] and
/// [`ContentType::set_raw`] write through this trait and are the only
/// outward-facing surface besides construction, accessors, and serialization.
pub trait HeaderStore {
    fn set_header(&mut self, name: &str, value: &str);
}

/// A structured Content-Type header value.
///
/// # Examples
///
/// ```
/// use content_type_rs::ContentType;
///
/// let value = ContentType::parse("text/plain; charset=us-ascii").unwrap();
/// assert_eq!(value.media_type(), "text");
/// assert_eq!(value.sub_type(), "plain");
/// assert_eq!(value.charset(), Some("us-ascii"));
/// ```
#[derive(Debug, Clone)]
pub struct ContentType {
    media_type: String,
    sub_type: String,
    parameters: ParameterStore,
    changed: bool,
    cached: Option<String>,
    persisted: bool,
}

impl ContentType {
    /// Creates the default `application/octet-stream` value.
    pub fn new() -> Self {
        ContentType {
            media_type: "application".to_string(),
            sub_type: "octet-stream".to_string(),
            parameters: ParameterStore::new(),
            changed: false,
            cached: Some(DEFAULT_MEDIA_TYPE.to_string()),
            persisted: false,
        }
    }

    /// Parses a raw header value body (no `Content-Type:` prefix).
    ///
    /// Empty input is [`Error::EmptyInput`]; every grammar failure is
    /// [`Error::InvalidFormat`]. On success the raw text becomes the cached
    /// serialization and the value starts out unchanged.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::EmptyInput);
        }
        let (media_type, sub_type, parameters) = parse_value(raw)?;
        debug!(%media_type, %sub_type, "parsed content type");
        Ok(ContentType {
            media_type,
            sub_type,
            parameters,
            changed: false,
            cached: Some(raw.to_string()),
            persisted: false,
        })
    }

    /// The media type half, e.g. `"text"` for `text/plain`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The subtype half, e.g. `"plain"` for `text/plain`.
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// The combined `type/subtype` pair without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.media_type, self.sub_type)
    }

    /// Replaces both halves from a combined `type/subtype` string.
    ///
    /// Stricter than [`parse`](Self::parse): nothing may follow the subtype
    /// token, parameters included. On failure the prior state is untouched.
    pub fn set_media_type(&mut self, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut offset = 0;
        let media_type = grammar::read_token(value, &mut offset);
        if media_type.is_empty() || offset >= value.len() || value.as_bytes()[offset] != b'/' {
            return Err(Error::InvalidFormat);
        }
        offset += 1;
        let sub_type = grammar::read_token(value, &mut offset);
        if sub_type.is_empty() || offset < value.len() {
            return Err(Error::InvalidFormat);
        }
        self.media_type = media_type.to_string();
        self.sub_type = sub_type.to_string();
        self.changed = true;
        self.persisted = false;
        Ok(())
    }

    /// The `charset` parameter, if present.
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset")
    }

    /// Sets the `charset` parameter; an empty value removes it.
    ///
    /// ```
    /// use content_type_rs::ContentType;
    ///
    /// let mut value = ContentType::parse("text/plain; charset=utf-8").unwrap();
    /// value.set_charset("");
    /// assert_eq!(value.charset(), None);
    /// ```
    pub fn set_charset(&mut self, value: &str) {
        if value.is_empty() {
            self.parameters.remove("charset");
        } else {
            self.parameters.set("charset", value);
        }
    }

    /// The `boundary` parameter, if present.
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary")
    }

    /// Sets the `boundary` parameter; an empty value removes it.
    pub fn set_boundary(&mut self, value: &str) {
        if value.is_empty() {
            self.parameters.remove("boundary");
        } else {
            self.parameters.set("boundary", value);
        }
    }

    /// The `name` parameter, decoded for presentation when the stored value
    /// looks like a MIME encoded word. The store itself is never mutated by
    /// this read.
    ///
    /// ```
    /// use content_type_rs::ContentType;
    ///
    /// let raw = "application/octet-stream; name=\"=?utf-8?B?aMOpbGxv?=\"";
    /// let value = ContentType::parse(raw).unwrap();
    /// assert_eq!(value.name().as_deref(), Some("héllo"));
    /// ```
    pub fn name(&self) -> Option<String> {
        let value = self.parameters.get("name")?;
        if encoded_word::detect(value).is_some() {
            Some(encoded_word::decode_encoded_word(value))
        } else {
            Some(value.to_string())
        }
    }

    /// Sets the `name` parameter; an empty value removes it.
    pub fn set_name(&mut self, value: &str) {
        if value.is_empty() {
            self.parameters.remove("name");
        } else {
            self.parameters.set("name", value);
        }
    }

    /// The full parameter store, in serialization order.
    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }

    /// Mutable access to the parameter store. Any mutation through the store
    /// marks the model changed.
    pub fn parameters_mut(&mut self) -> &mut ParameterStore {
        &mut self.parameters
    }

    /// Reports whether the cached serialization is stale relative to the
    /// structured state.
    pub fn is_changed(&self) -> bool {
        self.changed || self.parameters.is_dirty()
    }

    /// Reports whether [`persist_if_needed`](Self::persist_if_needed) would
    /// write to the header store.
    pub fn needs_persist(&self) -> bool {
        self.is_changed() || !self.persisted
    }

    /// The serialized header value body, recomputed only when the model has
    /// changed since the last serialization (or was never serialized).
    ///
    /// ```
    /// use content_type_rs::ContentType;
    ///
    /// let mut value = ContentType::parse("text/plain").unwrap();
    /// value.set_charset("utf-8");
    /// assert_eq!(value.header_value(), "text/plain; charset=utf-8");
    /// ```
    pub fn header_value(&mut self) -> &str {
        if self.cached.is_none() || self.is_changed() {
            trace!("re-encoding content type value");
            let text = format_content_type(&self.media_type, &self.sub_type, &self.parameters, false);
            self.changed = false;
            self.parameters.clear_dirty();
            self.persisted = false;
            self.cached = Some(text);
        }
        self.cached.get_or_insert_with(String::new)
    }

    /// Serializes the current state without touching the cache.
    ///
    /// `allow_unicode` permits raw non-ASCII parameter text where the header
    /// context accepts it; the cached wire form always uses `false`.
    pub fn encode(&self, allow_unicode: bool) -> String {
        format_content_type(&self.media_type, &self.sub_type, &self.parameters, allow_unicode)
    }

    /// Writes the serialized value into the external header store when the
    /// model changed since the last write, was never written, or `force` is
    /// set.
    pub fn persist_if_needed<S: HeaderStore>(&mut self, headers: &mut S, force: bool) {
        if self.needs_persist() || force {
            let text = self.header_value().to_string();
            headers.set_header(CONTENT_TYPE, &text);
            self.persisted = true;
        }
    }

    /// Reparses from raw text and immediately writes through to the header
    /// store. A parse failure leaves the prior state untouched.
    pub fn set_raw<S: HeaderStore>(&mut self, raw: &str, headers: &mut S) -> Result<()> {
        *self = Self::parse(raw)?;
        let text = self.header_value().to_string();
        headers.set_header(CONTENT_TYPE, &text);
        self.persisted = true;
        Ok(())
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cached {
            Some(text) if !self.is_changed() => f.write_str(text),
            _ => f.write_str(&self.encode(false)),
        }
    }
}

/// Equality compares the canonical wire encodings ignoring ASCII case, so
/// parameter order is significant while letter case is not.
impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.encode(false).eq_ignore_ascii_case(&other.encode(false))
    }
}

impl Eq for ContentType {}

impl Hash for ContentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encode(false).to_ascii_lowercase().hash(state);
    }
}

/// State machine over the cursor: media type, `/`, subtype, then a
/// `; name=value` loop until the input runs out.
fn parse_value(raw: &str) -> Result<(String, String, ParameterStore)> {
    let mut offset = 0;

    let media_type = grammar::read_token(raw, &mut offset);
    if media_type.is_empty() || offset >= raw.len() || raw.as_bytes()[offset] != b'/' {
        return Err(Error::InvalidFormat);
    }
    let media_type = media_type.to_string();
    offset += 1;

    let sub_type = grammar::read_token(raw, &mut offset);
    if sub_type.is_empty() {
        return Err(Error::InvalidFormat);
    }
    let sub_type = sub_type.to_string();

    let mut parameters = ParameterStore::new();
    while grammar::skip_cfws(raw, &mut offset)? {
        if raw.as_bytes()[offset] != b';' {
            return Err(Error::InvalidFormat);
        }
        offset += 1;

        // A single trailing `;` with nothing after it is tolerated.
        if !grammar::skip_cfws(raw, &mut offset)? {
            break;
        }

        let attribute = grammar::read_parameter_attribute(raw, &mut offset)?;
        if attribute.is_empty() {
            return Err(Error::InvalidFormat);
        }
        let attribute = attribute.to_string();

        if offset >= raw.len() || raw.as_bytes()[offset] != b'=' {
            return Err(Error::InvalidFormat);
        }
        offset += 1;

        // A value is mandatory after `=`.
        if !grammar::skip_cfws(raw, &mut offset)? {
            return Err(Error::InvalidFormat);
        }

        let value = if raw.as_bytes()[offset] == b'"' {
            grammar::read_quoted_string(raw, &mut offset)?
        } else {
            let token = grammar::read_token(raw, &mut offset);
            if token.is_empty() {
                return Err(Error::InvalidFormat);
            }
            token.to_string()
        };

        // Later duplicates overwrite earlier ones.
        parameters.set(&attribute, &value);
    }

    parameters.clear_dirty();
    Ok((media_type, sub_type, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let value = ContentType::parse("text/plain").unwrap();
        assert_eq!(value.media_type(), "text");
        assert_eq!(value.sub_type(), "plain");
        assert_eq!(value.essence(), "text/plain");
        assert!(value.parameters().is_empty());
    }

    #[test]
    fn test_parse_with_parameters() {
        let value = ContentType::parse("multipart/mixed; boundary=abc; charset=utf-8").unwrap();
        assert_eq!(value.boundary(), Some("abc"));
        assert_eq!(value.charset(), Some("utf-8"));
        assert_eq!(value.parameters().len(), 2);
    }

    #[test]
    fn test_parse_quoted_value() {
        let value = ContentType::parse("application/octet-stream; name=\"a b\"").unwrap();
        assert_eq!(value.name().as_deref(), Some("a b"));
    }

    #[test]
    fn test_parse_quoted_empty_value_is_valid() {
        let value = ContentType::parse("text/plain; name=\"\"").unwrap();
        assert_eq!(value.parameters().get("name"), Some(""));
    }

    #[test]
    fn test_parse_cfws_and_trailing_semicolon() {
        let value = ContentType::parse("text/plain (comment) ; charset=utf-8 ;").unwrap();
        assert_eq!(value.charset(), Some("utf-8"));
    }

    #[test]
    fn test_parse_value_after_equals_may_have_cfws() {
        let value = ContentType::parse("text/plain; charset= utf-8").unwrap();
        assert_eq!(value.charset(), Some("utf-8"));
    }

    #[test]
    fn test_parse_duplicate_parameter_last_wins() {
        let value = ContentType::parse("text/plain; a=1; a=2").unwrap();
        assert_eq!(value.parameters().get("a"), Some("2"));
        assert_eq!(value.parameters().len(), 1);
    }

    #[test]
    fn test_parse_rejects_missing_slash() {
        assert_eq!(ContentType::parse("texthtml"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert_eq!(ContentType::parse(""), Err(Error::EmptyInput));
    }

    #[test]
    fn test_parse_rejects_empty_tokens() {
        assert!(ContentType::parse("/plain").is_err());
        assert!(ContentType::parse("text/").is_err());
        assert!(ContentType::parse("text/plain; =x").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        assert_eq!(ContentType::parse("text/plain; charset="), Err(Error::InvalidFormat));
        assert_eq!(ContentType::parse("text/plain; charset"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_parse_rejects_bare_empty_token_value() {
        assert_eq!(ContentType::parse("text/plain; a=;"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_parse_rejects_unterminated_quote() {
        assert_eq!(ContentType::parse("text/plain; name=\"abc"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert_eq!(ContentType::parse("text/plain; a=b c"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_parse_failure_is_single_error_kind() {
        for raw in ["texthtml", "text/", "a/b; =1", "a/b; x", "a/b; x=\"y", "a/b x"] {
            assert_eq!(ContentType::parse(raw), Err(Error::InvalidFormat), "{raw}");
        }
    }

    #[test]
    fn test_default_value() {
        let mut value = ContentType::new();
        assert_eq!(value.essence(), DEFAULT_MEDIA_TYPE);
        assert!(!value.is_changed());
        assert!(value.needs_persist());
        assert_eq!(value.header_value(), DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn test_from_str() {
        let value: ContentType = "text/html; charset=utf-8".parse().unwrap();
        assert_eq!(value.sub_type(), "html");
    }

    #[test]
    fn test_set_media_type() {
        let mut value = ContentType::new();
        value.set_media_type("text/html").unwrap();
        assert_eq!(value.essence(), "text/html");
        assert!(value.is_changed());
    }

    #[test]
    fn test_set_media_type_rejects_trailing_input() {
        let mut value = ContentType::new();
        assert_eq!(value.set_media_type("text/html; charset=utf-8"), Err(Error::InvalidFormat));
        assert_eq!(value.set_media_type("text/html "), Err(Error::InvalidFormat));
        assert_eq!(value.set_media_type(""), Err(Error::EmptyInput));
        // failed setters leave prior state untouched
        assert_eq!(value.essence(), DEFAULT_MEDIA_TYPE);
        assert!(!value.is_changed());
    }

    #[test]
    fn test_header_value_caches_until_changed() {
        let mut value = ContentType::parse("text/plain; charset=us-ascii").unwrap();
        assert!(!value.is_changed());
        assert_eq!(value.header_value(), "text/plain; charset=us-ascii");
        assert!(!value.is_changed());

        value.set_charset("utf-8");
        assert!(value.is_changed());
        assert_eq!(value.header_value(), "text/plain; charset=utf-8");
        assert!(!value.is_changed());
    }

    #[test]
    fn test_charset_empty_removes() {
        let mut value = ContentType::parse("text/plain; charset=utf-8").unwrap();
        value.set_charset("");
        assert_eq!(value.charset(), None);
        assert_eq!(value.header_value(), "text/plain");
    }

    #[test]
    fn test_name_decode_on_read_keeps_store_raw() {
        let raw = "application/octet-stream; name=\"=?utf-8?B?aMOpbGxv?=\"";
        let value = ContentType::parse(raw).unwrap();
        assert_eq!(value.name().as_deref(), Some("héllo"));
        // decode-on-read must not mutate the store
        assert_eq!(value.parameters().get("name"), Some("=?utf-8?B?aMOpbGxv?="));
        assert!(!value.is_changed());
    }

    #[test]
    fn test_equality_ignores_case() {
        let a = ContentType::parse("a/b; x=1; y=2").unwrap();
        let b = ContentType::parse("A/B; X=1; Y=2").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_sensitive_to_parameter_order() {
        let a = ContentType::parse("a/b; x=1; y=2").unwrap();
        let b = ContentType::parse("a/b; y=2; x=1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_matches_equality() {
        use std::collections::hash_map::DefaultHasher;

        let a = ContentType::parse("a/b; x=1").unwrap();
        let b = ContentType::parse("A/B; X=1").unwrap();

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_display_matches_header_value() {
        let mut value = ContentType::parse("text/plain; charset=utf-8").unwrap();
        assert_eq!(value.to_string(), "text/plain; charset=utf-8");
        value.set_boundary("xyz");
        assert_eq!(value.to_string(), value.header_value().to_string());
    }
}
