//! Benchmark support for MoonlightDB.

#![warn(missing_docs)]

pub mod utils;
