//! # MoonlightDB Codec
//!
//! Document values and the JSON encoding of record sets.
//!
//! A collection is persisted as a single JSON array of objects. This crate
//! provides:
//! - [`Value`], the typed variant every record field holds
//! - [`Record`], an insertion-ordered field map
//! - [`to_json`] / [`from_json`] for whole record sets
//!
//! ## Usage
//!
//! ```
//! use moonlight_codec::{from_json, to_json, Record};
//!
//! let records = vec![Record::new().with("name", "Alice").with("xp", 99)];
//! let bytes = to_json(&records, true).unwrap();
//!
//! let decoded = from_json(&bytes).unwrap();
//! assert_eq!(records, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod record;
mod value;

pub use decoder::from_json;
pub use encoder::{to_json, JsonEncoder};
pub use error::{CodecError, CodecResult};
pub use record::Record;
pub use value::Value;
