//! Loadout library exports

pub mod catalog;
pub mod editor;
pub mod error;
pub mod materialize;
pub mod selection;

pub use error::{LoadoutError, RecordKind, Result};
