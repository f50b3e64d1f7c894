//! # MoonlightDB Core
//!
//! Collection engine for MoonlightDB, a small embedded document store.
//!
//! This crate provides:
//! - [`Database`]: opens a directory and manages named collections
//! - [`Collection`]: find, insert, update and delete over one collection
//! - [`Filter`] and [`Update`]: equality matching and `$set` updates
//! - [`IdGenerator`]: 32-character record identifiers
//!
//! Each collection is stored as one JSON array in
//! `<root>/moonlight_db/collections/<name>.dat` and is rewritten whole
//! on every mutation.
//!
//! ```rust,ignore
//! use moonlight_core::{Config, Database, Filter, Record, Update};
//!
//! let db = Database::open(Config::new("data"))?;
//! let users = db.create_collection("users")?;
//! users.insert_one(Record::new().with("name", "user_123"))?;
//! users.update(
//!     &Filter::eq("name", "user_123"),
//!     &Update::set(Record::new().with("xp", "0")),
//! )?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod database;
pub mod dir;
mod error;
mod id;
mod query;

pub use collection::Collection;
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use id::{generate_id, is_valid_id, IdGenerator, ID_FIELD, ID_LENGTH};
pub use query::{matches, Filter, Update, SET_OPERATION};

pub use moonlight_codec::{Record, Value};
