//! The percent-encoding engine: encode sets and the lazy byte transforms.
//!
//! Escape triplets are always three bytes `%`, then the uppercase hex of the
//! source byte, most significant nibble first.

mod decode;
mod encode;
mod encode_set;
pub(crate) mod tables;

pub use decode::{DecodedByte, DecodedBytes};
pub use encode::{EncodedBytes, encoded_length};
pub use encode_set::{
    C0Control, Component, EncodeSet, EncodeSetId, FormEncoded, Fragment, Passthrough, Path,
    PathComponent, Query, SpecialQuery, UserInfo, decode_sets,
};

/// Percent-encode `input` against `set`, lazily.
///
/// The output is within the ASCII range.
#[inline]
pub fn percent_encode<E: EncodeSet>(input: &[u8], set: E) -> EncodedBytes<'_, E> {
    EncodedBytes::new(input, set)
}

/// Percent-encode the UTF-8 encoding of `input` against `set`, lazily.
///
/// The output is within the ASCII range.
#[inline]
pub fn utf8_percent_encode<E: EncodeSet>(input: &str, set: E) -> EncodedBytes<'_, E> {
    EncodedBytes::new(input.as_bytes(), set)
}

/// Percent-decode `input`, reversing `set`'s substitutions, lazily.
///
/// Malformed escapes pass through verbatim; decoding never fails.
#[inline]
pub fn percent_decode<E: EncodeSet>(input: &[u8], set: E) -> DecodedBytes<'_, E> {
    DecodedBytes::new(input, set)
}
