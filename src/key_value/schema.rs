use crate::error::SchemaVerificationError;
use crate::percent::{self, EncodeSet};
use crate::url_structure::Component;

/// The URL components that can hold a key-value list.
///
/// Other opaque components could be added here without changing the view's
/// algorithms; only the mapping to structure fields would grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValueComponent {
    Query,
    Fragment,
}

impl KeyValueComponent {
    #[inline]
    pub(crate) fn component(self) -> Component {
        match self {
            Self::Query => Component::Query,
            Self::Fragment => Component::Fragment,
        }
    }

    /// The `?` or `#` that introduces the component.
    #[inline]
    pub(crate) fn leading_delimiter(self) -> char {
        match self {
            Self::Query => '?',
            Self::Fragment => '#',
        }
    }

    /// Whether the component's own encode set reserves `byte`. Queries use
    /// the special-query set so output is valid for every scheme.
    #[inline]
    pub(crate) fn base_set_reserves(self, byte: u8) -> bool {
        match self {
            Self::Query => percent::SpecialQuery.should_percent_encode(byte),
            Self::Fragment => percent::Fragment.should_percent_encode(byte),
        }
    }
}

/// How a key-value list is laid out inside a URL component: which bytes
/// delimit pairs and keys from values, how spaces travel, and what extra
/// escaping the format wants.
///
/// The reading predicates may accept more delimiters than the preferred
/// ones (a query schema might read both `&` and `;`); writing always uses
/// the preferred bytes. [`verify`](Self::verify) is the contract for
/// accepting custom schemas: views abort on schemas that fail it.
pub trait KeyValueSchema {
    /// The byte written between pairs.
    fn preferred_pair_delimiter(&self) -> u8;

    /// The byte written between a key and its value.
    fn preferred_kv_delimiter(&self) -> u8;

    /// Whether `byte` separates pairs when reading.
    #[inline]
    fn is_pair_delimiter(&self, byte: u8) -> bool {
        byte == self.preferred_pair_delimiter()
    }

    /// Whether `byte` separates a key from its value when reading.
    #[inline]
    fn is_kv_delimiter(&self, byte: u8) -> bool {
        byte == self.preferred_kv_delimiter()
    }

    /// Whether `+` in the encoded text means space.
    fn decode_plus_as_space(&self) -> bool;

    /// Whether a literal space in an inserted key or value is written as `+`
    /// instead of `%20`. Requires [`decode_plus_as_space`] to also be true.
    ///
    /// [`decode_plus_as_space`]: Self::decode_plus_as_space
    #[inline]
    fn encode_space_as_plus(&self) -> bool {
        false
    }

    /// Extra bytes to escape beyond what the component itself requires.
    #[inline]
    fn should_percent_encode(&self, _byte: u8) -> bool {
        false
    }

    /// Whether writes through this schema leave a query in canonical
    /// `application/x-www-form-urlencoded` form.
    #[inline]
    fn is_known_form_encoded(&self) -> bool {
        false
    }

    /// Check that this schema can round-trip inside `component`: delimiters
    /// must be ASCII, must not collide with percent-escapes, substituted
    /// spaces, or the component's own reserved bytes, and the reading
    /// predicates must agree with the preferred delimiters.
    fn verify(&self, component: KeyValueComponent) -> Result<(), SchemaVerificationError> {
        let pair = self.preferred_pair_delimiter();
        let kv = self.preferred_kv_delimiter();
        if !is_valid_delimiter(pair, component) {
            return Err(SchemaVerificationError::PreferredPairDelimiterInvalid);
        }
        if !is_valid_delimiter(kv, component) {
            return Err(SchemaVerificationError::PreferredKvDelimiterInvalid);
        }
        if !self.is_pair_delimiter(pair) {
            return Err(SchemaVerificationError::PreferredPairDelimiterNotRecognized);
        }
        if !self.is_kv_delimiter(kv) {
            return Err(SchemaVerificationError::PreferredKvDelimiterNotRecognized);
        }
        for byte in u8::MIN..=u8::MAX {
            if !is_forbidden_delimiter(byte) {
                continue;
            }
            if self.is_pair_delimiter(byte) {
                return Err(SchemaVerificationError::InvalidPairDelimiterRecognized);
            }
            if self.is_kv_delimiter(byte) {
                return Err(SchemaVerificationError::InvalidKvDelimiterRecognized);
            }
        }
        if self.encode_space_as_plus() && !self.decode_plus_as_space() {
            return Err(SchemaVerificationError::InconsistentSpaceEncoding);
        }
        Ok(())
    }
}

/// Delimiters may never collide with escape triplets, substituted spaces,
/// or bytes the component itself escapes away.
fn is_forbidden_delimiter(byte: u8) -> bool {
    byte == b'%' || byte == b'+' || byte.is_ascii_hexdigit()
}

fn is_valid_delimiter(byte: u8, component: KeyValueComponent) -> bool {
    byte < 0x80
        && byte != b' '
        && !is_forbidden_delimiter(byte)
        && !component.base_set_reserves(byte)
}

/// `application/x-www-form-urlencoded`: pairs split on `&`, keys from values
/// on `=`, `+` reads as space. Writing stays conservative: spaces become
/// `%20` and everything the form encode set reserves is escaped, so the
/// output parses identically under both form and plain percent decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormEncoded;

impl KeyValueSchema for FormEncoded {
    #[inline]
    fn preferred_pair_delimiter(&self) -> u8 {
        b'&'
    }

    #[inline]
    fn preferred_kv_delimiter(&self) -> u8 {
        b'='
    }

    #[inline]
    fn decode_plus_as_space(&self) -> bool {
        true
    }

    #[inline]
    fn should_percent_encode(&self, byte: u8) -> bool {
        percent::FormEncoded.should_percent_encode(byte)
    }

    #[inline]
    fn is_known_form_encoded(&self) -> bool {
        true
    }
}

/// Plain percent-encoded pairs: `&` and `=` delimiters, `+` is a literal,
/// nothing escaped beyond what the component requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PercentEncoded;

impl KeyValueSchema for PercentEncoded {
    #[inline]
    fn preferred_pair_delimiter(&self) -> u8 {
        b'&'
    }

    #[inline]
    fn preferred_kv_delimiter(&self) -> u8 {
        b'='
    }

    #[inline]
    fn decode_plus_as_space(&self) -> bool {
        false
    }
}

/// The encode set every inserted key and value goes through: the component's
/// own reserved bytes, the schema's delimiters and extra escapes, `%` (so
/// written text never forges an escape), and `+` (so written text never
/// forges a substituted space). Spaces follow the schema's space policy.
///
/// Its `unsubstitute` carries the schema's read policy, so the same set
/// drives decoding.
#[derive(Debug)]
pub struct KeyValuePairComponentEncodeSet<'s, S> {
    schema: &'s S,
    component: KeyValueComponent,
}

// Not derived: the derive would demand `S: Clone`/`S: Copy`, but this only
// holds a reference to the schema.
impl<S> Clone for KeyValuePairComponentEncodeSet<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for KeyValuePairComponentEncodeSet<'_, S> {}

impl<'s, S: KeyValueSchema> KeyValuePairComponentEncodeSet<'s, S> {
    pub(crate) fn new(schema: &'s S, component: KeyValueComponent) -> Self {
        Self { schema, component }
    }
}

impl<S: KeyValueSchema> EncodeSet for KeyValuePairComponentEncodeSet<'_, S> {
    fn should_percent_encode(&self, byte: u8) -> bool {
        if byte == b' ' {
            return !self.schema.encode_space_as_plus();
        }
        byte >= 0x80
            || byte == b'%'
            || byte == b'+'
            || self.schema.is_pair_delimiter(byte)
            || self.schema.is_kv_delimiter(byte)
            || self.schema.should_percent_encode(byte)
            || self.component.base_set_reserves(byte)
    }

    #[inline]
    fn substitute(&self, byte: u8) -> Option<u8> {
        (byte == b' ' && self.schema.encode_space_as_plus()).then_some(b'+')
    }

    #[inline]
    fn unsubstitute(&self, byte: u8) -> Option<u8> {
        (byte == b'+' && self.schema.decode_plus_as_space()).then_some(b' ')
    }
}
