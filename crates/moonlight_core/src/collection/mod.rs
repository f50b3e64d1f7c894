//! Collection API.
//!
//! A [`Collection`] is a named, persisted list of schema-less records with
//! find, insert, update and delete operations.

mod store;

pub use store::Collection;
