/// A mutation would push the URL serialization past
/// [`MAX_SERIALIZED_LENGTH`](crate::MAX_SERIALIZED_LENGTH).
///
/// This is the only recoverable failure in the crate. The operation that
/// reports it leaves the URL exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceedsMaximumSize;

impl core::fmt::Display for ExceedsMaximumSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("URL would exceed the maximum serialized length")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExceedsMaximumSize {}

/// Reasons a [`KeyValueSchema`](crate::key_value::KeyValueSchema) can fail
/// verification for a component.
///
/// Produced only by `KeyValueSchema::verify`. Views treat a schema that fails
/// verification as a programmer error and abort rather than limping along
/// with delimiters that cannot round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaVerificationError {
    /// The preferred key-value delimiter is non-ASCII, a `%`/`+`/space/hex
    /// digit, or reserved by the component's own encode set.
    PreferredKvDelimiterInvalid,
    /// `is_kv_delimiter` does not recognize the preferred key-value delimiter.
    PreferredKvDelimiterNotRecognized,
    /// The preferred pair delimiter is non-ASCII, a `%`/`+`/space/hex digit,
    /// or reserved by the component's own encode set.
    PreferredPairDelimiterInvalid,
    /// `is_pair_delimiter` does not recognize the preferred pair delimiter.
    PreferredPairDelimiterNotRecognized,
    /// `is_kv_delimiter` recognizes `%`, `+`, or a hex digit.
    InvalidKvDelimiterRecognized,
    /// `is_pair_delimiter` recognizes `%`, `+`, or a hex digit.
    InvalidPairDelimiterRecognized,
    /// The schema writes spaces as `+` but does not read `+` back as space.
    InconsistentSpaceEncoding,
}

impl core::fmt::Display for SchemaVerificationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::PreferredKvDelimiterInvalid => "preferred key-value delimiter is invalid",
            Self::PreferredKvDelimiterNotRecognized => {
                "preferred key-value delimiter is not recognized by is_kv_delimiter"
            }
            Self::PreferredPairDelimiterInvalid => "preferred pair delimiter is invalid",
            Self::PreferredPairDelimiterNotRecognized => {
                "preferred pair delimiter is not recognized by is_pair_delimiter"
            }
            Self::InvalidKvDelimiterRecognized => {
                "is_kv_delimiter recognizes a percent sign, plus sign, or hex digit"
            }
            Self::InvalidPairDelimiterRecognized => {
                "is_pair_delimiter recognizes a percent sign, plus sign, or hex digit"
            }
            Self::InconsistentSpaceEncoding => {
                "schema encodes space as plus without decoding plus as space"
            }
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SchemaVerificationError {}

/// Errors from [`UrlStorage::from_well_formed`](crate::UrlStorage::from_well_formed).
///
/// The splitter only discovers structure in an already normalized URL string;
/// anything it cannot account for is rejected rather than repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SplitError {
    /// No `scheme:` prefix.
    MissingScheme,
    /// A byte in the scheme is not ASCII alphanumeric, `+`, `-`, or `.`.
    InvalidSchemeCharacter,
    /// The authority section is not in serialized form (for example an `@`
    /// with empty credentials, or a special scheme without an authority).
    MalformedAuthority,
    /// The port is empty or contains a non-digit.
    InvalidPort,
    /// A special-scheme URL without a path; the serializer always writes one.
    MissingPath,
    /// The input is longer than the storage can index.
    TooLong,
}

impl core::fmt::Display for SplitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::MissingScheme => "missing scheme",
            Self::InvalidSchemeCharacter => "invalid character in scheme",
            Self::MalformedAuthority => "authority is not in serialized form",
            Self::InvalidPort => "invalid port",
            Self::MissingPath => "special-scheme URL without a path",
            Self::TooLong => "input exceeds the maximum serialized length",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SplitError {}
