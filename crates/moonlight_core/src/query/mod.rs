//! Record selection and modification.
//!
//! A [`Filter`] selects records by exact field equality; an [`Update`]
//! describes how selected records change.

mod filter;
mod update;

pub use filter::{matches, Filter};
pub use update::{Update, SET_OPERATION};
