//! Shared data model for Emberfall Chronicles content.
//!
//! Catalog entries (quests and items) are immutable once loaded; the engine
//! reads them for the life of a session and never writes them back.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_quest_catalog};
