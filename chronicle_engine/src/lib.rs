#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const CHRONICLE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod character;
pub mod combat;
pub mod data_paths;
pub mod inventory;
pub mod loader;
pub mod quests;
pub mod repl;
pub mod save_files;
pub mod style;

// Re-exports for convenience
pub use character::{Character, CharacterError, ClassArchetype};
pub use combat::{Battle, BattleReport, CombatError, Enemy, EnemyKind, Winner};
pub use loader::{Catalogs, load_catalogs};
pub use quests::QuestError;
pub use repl::run_repl;
