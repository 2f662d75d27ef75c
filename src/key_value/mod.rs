//! Key-value pair views over URL components.
//!
//! A view interprets a component's bytes as a list of `key=value` pairs
//! under a pluggable [`KeyValueSchema`], without materializing the list:
//! reads decode on the fly and writes splice encoded bytes back into the
//! URL's storage.

mod pairs;
pub mod schema;

pub use pairs::{KeyValuePairs, KeyValuePairsMut, PairIndex, Pairs};
pub use schema::{
    FormEncoded, KeyValueComponent, KeyValuePairComponentEncodeSet, KeyValueSchema, PercentEncoded,
};
