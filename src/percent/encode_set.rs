use super::tables;

/// A set of bytes that must be percent-encoded within some part of a URL.
///
/// Different characters need to be encoded in different parts of a URL: a
/// literal `?` in a path would read as the start of the query string, but in
/// the query itself it carries no meaning. Each URL component therefore has
/// its own encode set, and the standard family below mirrors the contexts
/// the WHATWG URL standard distinguishes.
///
/// A set may also declare a *substitution*: a byte emitted instead of an
/// escape, the way form encoding writes spaces as `+`. Substitute outputs
/// must themselves be reserved by `should_percent_encode`, so that a literal
/// occurrence of the substitute byte survives a round trip in escaped form.
pub trait EncodeSet {
    /// Whether `byte` may not appear verbatim in this context.
    ///
    /// Must return `true` for every non-ASCII byte.
    fn should_percent_encode(&self, byte: u8) -> bool;

    /// The byte to emit *instead of* `byte`, or `None` to emit it as-is.
    /// Only consulted for bytes that are not percent-encoded.
    #[inline]
    fn substitute(&self, _byte: u8) -> Option<u8> {
        None
    }

    /// Reverses [`substitute`](Self::substitute) while decoding.
    #[inline]
    fn unsubstitute(&self, _byte: u8) -> Option<u8> {
        None
    }
}

impl<E: EncodeSet + ?Sized> EncodeSet for &E {
    #[inline]
    fn should_percent_encode(&self, byte: u8) -> bool {
        (**self).should_percent_encode(byte)
    }

    #[inline]
    fn substitute(&self, byte: u8) -> Option<u8> {
        (**self).substitute(byte)
    }

    #[inline]
    fn unsubstitute(&self, byte: u8) -> Option<u8> {
        (**self).unsubstitute(byte)
    }
}

macro_rules! table_encode_set {
    ($(#[$attr:meta])* $name:ident, $bit:expr) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl EncodeSet for $name {
            #[inline]
            fn should_percent_encode(&self, byte: u8) -> bool {
                const MASKS: (u64, u64) = tables::mask_pair($bit);
                tables::is_reserved_by_mask(MASKS, byte)
            }
        }
    };
}

table_encode_set! {
    /// C0 controls and DEL; the floor every other set builds on.
    C0Control, tables::C0_CONTROL
}

table_encode_set! {
    /// Encode set for fragment identifiers.
    Fragment, tables::FRAGMENT
}

table_encode_set! {
    /// Encode set for query strings of non-special URLs.
    Query, tables::QUERY
}

table_encode_set! {
    /// Encode set for query strings of special URLs (adds `'`).
    SpecialQuery, tables::SPECIAL_QUERY
}

table_encode_set! {
    /// Encode set for path segments written in place.
    Path, tables::PATH
}

table_encode_set! {
    /// Encode set for usernames and passwords.
    UserInfo, tables::USERINFO
}

table_encode_set! {
    /// Encode set for values injected into an arbitrary component; escapes
    /// URL syntax characters (`$ % & + ,`) on top of [`UserInfo`].
    Component, tables::COMPONENT
}

/// Encode set for `application/x-www-form-urlencoded` output.
///
/// On top of [`Component`] this reserves `! ' ( ) ~`, and substitutes
/// spaces with `+` (reversed by [`unsubstitute`](EncodeSet::unsubstitute)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormEncoded;

impl EncodeSet for FormEncoded {
    #[inline]
    fn should_percent_encode(&self, byte: u8) -> bool {
        const MASKS: (u64, u64) = tables::mask_pair(tables::FORM);
        tables::is_reserved_by_mask(MASKS, byte)
    }

    #[inline]
    fn substitute(&self, byte: u8) -> Option<u8> {
        (byte == b' ').then_some(b'+')
    }

    #[inline]
    fn unsubstitute(&self, byte: u8) -> Option<u8> {
        (byte == b'+').then_some(b' ')
    }
}

/// Encodes nothing; used to splice bytes that are already in encoded form,
/// and as the plain decode set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Passthrough;

impl EncodeSet for Passthrough {
    #[inline]
    fn should_percent_encode(&self, _byte: u8) -> bool {
        false
    }
}

/// [`Path`] plus the path separators themselves; for encoding a *single*
/// path segment so that slashes inside it do not create new segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathComponent;

impl EncodeSet for PathComponent {
    #[inline]
    fn should_percent_encode(&self, byte: u8) -> bool {
        byte == b'/' || byte == b'\\' || tables::is_reserved(byte, tables::PATH)
    }
}

/// The encode-set family by name, for callers that select a set at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeSetId {
    C0Control,
    Fragment,
    Query,
    SpecialQuery,
    Path,
    UserInfo,
    Component,
    FormEncoded,
    Passthrough,
    PathComponent,
}

impl EncodeSetId {
    /// All ten members, in subset order for the table-backed chain.
    pub const ALL: [Self; 10] = [
        Self::C0Control,
        Self::Fragment,
        Self::Query,
        Self::SpecialQuery,
        Self::Path,
        Self::UserInfo,
        Self::Component,
        Self::FormEncoded,
        Self::Passthrough,
        Self::PathComponent,
    ];
}

impl EncodeSet for EncodeSetId {
    #[inline]
    fn should_percent_encode(&self, byte: u8) -> bool {
        match self {
            Self::C0Control => C0Control.should_percent_encode(byte),
            Self::Fragment => Fragment.should_percent_encode(byte),
            Self::Query => Query.should_percent_encode(byte),
            Self::SpecialQuery => SpecialQuery.should_percent_encode(byte),
            Self::Path => Path.should_percent_encode(byte),
            Self::UserInfo => UserInfo.should_percent_encode(byte),
            Self::Component => Component.should_percent_encode(byte),
            Self::FormEncoded => FormEncoded.should_percent_encode(byte),
            Self::Passthrough => Passthrough.should_percent_encode(byte),
            Self::PathComponent => PathComponent.should_percent_encode(byte),
        }
    }

    #[inline]
    fn substitute(&self, byte: u8) -> Option<u8> {
        match self {
            Self::FormEncoded => FormEncoded.substitute(byte),
            _ => None,
        }
    }

    #[inline]
    fn unsubstitute(&self, byte: u8) -> Option<u8> {
        match self {
            Self::FormEncoded => FormEncoded.unsubstitute(byte),
            _ => None,
        }
    }
}

/// The sets used for *decoding*. Decoding only consults
/// [`unsubstitute`](EncodeSet::unsubstitute), so two members suffice.
pub mod decode_sets {
    /// Reverses `%XX` escapes only.
    pub use super::Passthrough as PercentEncodedOnly;

    /// Reverses `%XX` escapes and reads `+` as space.
    pub use super::FormEncoded as Form;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_always_reserved() {
        for byte in 0x80u8..=0xFF {
            for id in EncodeSetId::ALL {
                if id == EncodeSetId::Passthrough {
                    continue;
                }
                assert!(id.should_percent_encode(byte), "{id:?} passed {byte:#04x}");
            }
        }
    }

    #[test]
    fn test_userinfo_members() {
        for byte in [b'/', b':', b';', b'=', b'@', b'[', b'\\', b']', b'^', b'|'] {
            assert!(UserInfo.should_percent_encode(byte));
            assert!(!Path.should_percent_encode(byte));
        }
        assert!(!UserInfo.should_percent_encode(b','));
        assert!(Component.should_percent_encode(b','));
    }

    #[test]
    fn test_form_substitution_round_trip() {
        assert_eq!(FormEncoded.substitute(b' '), Some(b'+'));
        assert_eq!(FormEncoded.unsubstitute(b'+'), Some(b' '));
        // The substitute output must itself be reserved, so a literal '+'
        // never collides with a substituted space.
        assert!(FormEncoded.should_percent_encode(b'+'));
        assert!(!FormEncoded.should_percent_encode(b' '));
    }

    #[test]
    fn test_path_component_adds_separators() {
        assert!(PathComponent.should_percent_encode(b'/'));
        assert!(PathComponent.should_percent_encode(b'\\'));
        assert!(!Path.should_percent_encode(b'/'));
    }
}
