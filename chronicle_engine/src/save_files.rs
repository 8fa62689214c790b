//! Character save files: one flat `KEY: value` text file per character.
//!
//! A save named `Hero` lands at `<dir>/hero_save.txt` with one line per
//! stat; the three list fields are comma-joined. Equipment slots and battle
//! flags are transient and deliberately not written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chronicle_data::Id;
use log::info;
use thiserror::Error;

use crate::character::{Character, ClassArchetype};

/// Default directory for character save files.
pub const SAVE_DIR: &str = "saved_games";

const SAVE_SUFFIX: &str = "_save.txt";

/// Failures reading or writing save files.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save file for character '{0}'")]
    NotFound(String),
    #[error("could not read save for '{name}'")]
    Corrupted {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("save for '{name}' is invalid: {reason}")]
    InvalidData { name: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reduce a character name to a filesystem-safe stem.
fn sanitize_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() { "unnamed".to_string() } else { stem }
}

/// Path of the save file for `name` inside `dir`.
pub fn save_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{SAVE_SUFFIX}", sanitize_name(name)))
}

/// Write `character` to its save file under `dir`, creating the directory
/// if needed. An existing save for the same name is overwritten.
///
/// # Errors
/// IO failures creating the directory or writing the file.
pub fn save_character(dir: &Path, character: &Character) -> Result<PathBuf, SaveError> {
    fs::create_dir_all(dir)?;
    let path = save_path(dir, &character.name);

    let mut out = String::new();
    out.push_str(&format!("NAME: {}\n", character.name));
    out.push_str(&format!("CLASS: {}\n", character.class));
    out.push_str(&format!("LEVEL: {}\n", character.level));
    out.push_str(&format!("HEALTH: {}\n", character.health));
    out.push_str(&format!("MAX_HEALTH: {}\n", character.max_health));
    out.push_str(&format!("STRENGTH: {}\n", character.strength));
    out.push_str(&format!("MAGIC: {}\n", character.magic));
    out.push_str(&format!("EXPERIENCE: {}\n", character.experience));
    out.push_str(&format!("GOLD: {}\n", character.gold));
    out.push_str(&format!("INVENTORY: {}\n", character.inventory.join(",")));
    out.push_str(&format!("ACTIVE_QUESTS: {}\n", character.active_quests.join(",")));
    out.push_str(&format!("COMPLETED_QUESTS: {}\n", character.completed_quests.join(",")));

    fs::write(&path, out)?;
    info!("saved {} to {}", character.name, path.display());
    Ok(path)
}

/// Load the character saved as `name` from `dir`.
///
/// # Errors
/// [`SaveError::NotFound`] if no save exists, [`SaveError::Corrupted`] on
/// read failure, [`SaveError::InvalidData`] when a field is missing or
/// unparseable.
pub fn load_character(dir: &Path, name: &str) -> Result<Character, SaveError> {
    let path = save_path(dir, name);
    if !path.exists() {
        return Err(SaveError::NotFound(name.to_string()));
    }
    let text = fs::read_to_string(&path).map_err(|source| SaveError::Corrupted {
        name: name.to_string(),
        source,
    })?;

    let mut fields = std::collections::HashMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_uppercase(), value.trim().to_string());
        }
    }

    let invalid = |reason: String| SaveError::InvalidData {
        name: name.to_string(),
        reason,
    };
    let field = |key: &str| {
        fields
            .get(key)
            .cloned()
            .ok_or_else(|| invalid(format!("missing field '{key}'")))
    };
    let int_field = |key: &str| -> Result<i64, SaveError> {
        field(key)?
            .parse()
            .map_err(|_| invalid(format!("field '{key}' is not a number")))
    };

    let class: ClassArchetype = field("CLASS")?
        .parse()
        .map_err(|err| invalid(format!("{err}")))?;
    let level: u32 = field("LEVEL")?
        .parse()
        .map_err(|_| invalid("field 'LEVEL' is not a number".to_string()))?;

    Ok(Character {
        name: field("NAME")?,
        class,
        level,
        health: int_field("HEALTH")?,
        max_health: int_field("MAX_HEALTH")?,
        strength: int_field("STRENGTH")?,
        magic: int_field("MAGIC")?,
        experience: int_field("EXPERIENCE")?,
        gold: int_field("GOLD")?,
        inventory: split_list(&field("INVENTORY")?),
        active_quests: split_list(&field("ACTIVE_QUESTS")?),
        completed_quests: split_list(&field("COMPLETED_QUESTS")?),
        equipped_weapon: None,
        equipped_armor: None,
        in_battle: false,
        ability_on_cooldown: false,
    })
}

fn split_list(value: &str) -> Vec<Id> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Names of all characters with a save file in `dir`, sorted. An absent
/// directory reads as no saves.
///
/// # Errors
/// IO failures enumerating the directory.
pub fn list_saved_characters(dir: &Path) -> Result<Vec<String>, SaveError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(file_name) = path.file_name().and_then(|n| n.to_str())
            && let Some(stem) = file_name.strip_suffix(SAVE_SUFFIX)
            && !stem.is_empty()
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Delete the save file for `name`.
///
/// # Errors
/// [`SaveError::NotFound`] if there is nothing to delete.
pub fn delete_character(dir: &Path, name: &str) -> Result<(), SaveError> {
    let path = save_path(dir, name);
    if !path.exists() {
        return Err(SaveError::NotFound(name.to_string()));
    }
    fs::remove_file(&path)?;
    info!("deleted save {}", path.display());
    Ok(())
}
