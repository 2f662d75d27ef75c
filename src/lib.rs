//! Mutable URL storage with WHATWG-style percent-encoding and key-value
//! pair views.
//!
//! The crate has three layers:
//!
//! - [`percent`]: the encoding engine, a closed family of encode sets and
//!   the lazy [`EncodedBytes`](percent::EncodedBytes) /
//!   [`DecodedBytes`](percent::DecodedBytes) transforms.
//! - [`UrlStorage`]: one contiguous serialization plus a fixed-width
//!   [`UrlStructure`] describing where each component lives, with value
//!   semantics and copy-on-write.
//! - [`key_value`]: list-of-pairs views over the query or fragment, with
//!   index-based and key-based reads and in-place mutation.
//!
//! ```
//! use urlbuf::UrlStorage;
//!
//! let mut url: UrlStorage = "http://example.com/convert".parse()?;
//! let mut pairs = url.query_pairs_mut();
//! pairs.append_pairs([("amount", "200"), ("from", "EUR"), ("to", "GBP")])?;
//! assert_eq!(url.as_str(), "http://example.com/convert?amount=200&from=EUR&to=GBP");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Compatibility layer for std/no_std
mod compat;

mod error;
mod scheme;
mod splitter;
mod url_storage;
mod url_structure;

pub mod key_value;
pub mod percent;

pub use error::{ExceedsMaximumSize, SchemaVerificationError, SplitError};
pub use scheme::SchemeKind;
pub use url_storage::{Authority, MAX_SERIALIZED_LENGTH, UrlStorage};
pub use url_structure::{Component, HostKind, Sigil, UrlStructure};
