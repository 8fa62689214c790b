//! Catalog loading for quests and items.
//!
//! Catalogs are plain text files of blank-line-delimited blocks, each block a
//! set of `KEY: value` lines. Missing data files are bootstrapped with the
//! starter content on first run.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chronicle_data::{Effect, Id, Item, ItemKind, Quest, validate_quest_catalog};
use log::info;
use thiserror::Error;

use crate::data_paths::{data_path, data_root};

const QUESTS_FILE: &str = "quests.txt";
const ITEMS_FILE: &str = "items.txt";

/// Problems reading or parsing catalog files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file not found: {0}")]
    MissingFile(PathBuf),
    #[error("could not read {path}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("bad data in {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },
}

/// The loaded game content: quests and items, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub quests: HashMap<Id, Quest>,
    pub items: HashMap<Id, Item>,
}

/// Load both catalogs from the data directory, writing the starter files
/// first if they do not exist yet.
///
/// # Errors
/// Bubbles up file IO and parse failures; quest prerequisite references are
/// validated and reported as [`DataError::InvalidFormat`].
pub fn load_catalogs() -> Result<Catalogs, DataError> {
    let root = data_root();
    create_default_data_files(&root).map_err(|source| DataError::Corrupted {
        path: root.clone(),
        source,
    })?;

    let quests = load_quests(&data_path(QUESTS_FILE))?;
    let items = load_items(&data_path(ITEMS_FILE))?;
    info!("{} quests loaded from {QUESTS_FILE}", quests.len());
    info!("{} items loaded from {ITEMS_FILE}", items.len());

    Ok(Catalogs { quests, items })
}

/// Load and validate the quest catalog from one file.
///
/// # Errors
/// IO and format failures as [`DataError`].
pub fn load_quests(path: &Path) -> Result<HashMap<Id, Quest>, DataError> {
    let mut quests = HashMap::new();
    for block in read_blocks(path)? {
        let quest = parse_quest_block(path, &block)?;
        quests.insert(quest.id.clone(), quest);
    }

    let problems = validate_quest_catalog(&quests);
    if !problems.is_empty() {
        let details = problems
            .iter()
            .map(|err| format!("- {err}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(DataError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("quest catalog validation failed:\n{details}"),
        });
    }
    Ok(quests)
}

/// Load the item catalog from one file.
///
/// # Errors
/// IO and format failures as [`DataError`].
pub fn load_items(path: &Path) -> Result<HashMap<Id, Item>, DataError> {
    let mut items = HashMap::new();
    for block in read_blocks(path)? {
        let item = parse_item_block(path, &block)?;
        items.insert(item.id.clone(), item);
    }
    Ok(items)
}

/// Split a catalog file into blocks of `KEY: value` pairs. Blocks are
/// separated by blank lines; keys are uppercased so authored files are
/// case-insensitive on the key side.
fn read_blocks(path: &Path) -> Result<Vec<HashMap<String, String>>, DataError> {
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| DataError::Corrupted {
        path: path.to_path_buf(),
        source,
    })?;

    let mut blocks = Vec::new();
    let mut current: HashMap<String, String> = HashMap::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(DataError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("line {} is not 'KEY: value'", line_no + 1),
            });
        };
        current.insert(key.trim().to_uppercase(), value.trim().to_string());
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    Ok(blocks)
}

fn require<'b>(
    path: &Path,
    block: &'b HashMap<String, String>,
    key: &str,
) -> Result<&'b str, DataError> {
    block
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DataError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("block is missing required key '{key}'"),
        })
}

fn parse_int<T: std::str::FromStr>(path: &Path, key: &str, value: &str) -> Result<T, DataError> {
    value.parse().map_err(|_| DataError::InvalidFormat {
        path: path.to_path_buf(),
        reason: format!("'{key}' value '{value}' is not a valid number"),
    })
}

fn parse_quest_block(path: &Path, block: &HashMap<String, String>) -> Result<Quest, DataError> {
    let id = require(path, block, "ID")?.to_string();
    let title = require(path, block, "TITLE")?.to_string();
    let description = require(path, block, "DESCRIPTION")?.to_string();
    let reward_xp = parse_int(path, "REWARD_XP", require(path, block, "REWARD_XP")?)?;
    let reward_gold = parse_int(path, "REWARD_GOLD", require(path, block, "REWARD_GOLD")?)?;
    let required_level = parse_int(path, "REQUIRED_LEVEL", require(path, block, "REQUIRED_LEVEL")?)?;

    let prerequisite = require(path, block, "PREREQUISITE")?;
    let prerequisite = if prerequisite.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(prerequisite.to_string())
    };

    Ok(Quest {
        id,
        title,
        description,
        reward_xp,
        reward_gold,
        required_level,
        prerequisite,
    })
}

fn parse_item_block(path: &Path, block: &HashMap<String, String>) -> Result<Item, DataError> {
    let id = require(path, block, "ID")?.to_string();
    let name = require(path, block, "NAME")?.to_string();
    let description = require(path, block, "DESCRIPTION")?.to_string();
    let cost = parse_int(path, "COST", require(path, block, "COST")?)?;

    let kind: ItemKind =
        require(path, block, "TYPE")?
            .parse()
            .map_err(|err| DataError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("item '{id}': {err}"),
            })?;
    let effect: Effect =
        require(path, block, "EFFECT")?
            .parse()
            .map_err(|err| DataError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!("item '{id}': {err}"),
            })?;

    Ok(Item {
        id,
        name,
        kind,
        effect,
        cost,
        description,
    })
}

const DEFAULT_QUESTS: &str = "\
ID: quest_intro
TITLE: A Humble Beginning
DESCRIPTION: Speak with the village elder and learn the lay of the land.
REWARD_XP: 50
REWARD_GOLD: 20
REQUIRED_LEVEL: 1
PREREQUISITE: NONE

ID: quest_hunt_goblins
TITLE: Goblin Trouble
DESCRIPTION: Drive the goblins out of the eastern woods.
REWARD_XP: 150
REWARD_GOLD: 75
REQUIRED_LEVEL: 2
PREREQUISITE: quest_intro
";

const DEFAULT_ITEMS: &str = "\
ID: sword_basic
NAME: Basic Sword
TYPE: weapon
EFFECT: strength:5
COST: 100
DESCRIPTION: A dependable iron blade.

ID: robe_apprentice
NAME: Apprentice Robe
TYPE: armor
EFFECT: health:10
COST: 80
DESCRIPTION: A sturdy cloth robe with a padded lining.

ID: potion_small
NAME: Small Health Potion
TYPE: consumable
EFFECT: health:20
COST: 30
DESCRIPTION: Restores a modest amount of health when drunk.
";

/// Write the starter quest and item files into `dir` for any that are
/// missing. Existing files are left alone.
///
/// # Errors
/// IO failures creating the directory or writing a file.
pub fn create_default_data_files(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for (file, content) in [(QUESTS_FILE, DEFAULT_QUESTS), (ITEMS_FILE, DEFAULT_ITEMS)] {
        let path = dir.join(file);
        if !path.exists() {
            fs::write(&path, content)?;
            info!("wrote starter data file {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_data::StatKind;
    use tempfile::tempdir;

    #[test]
    fn starter_files_parse_back_into_catalogs() {
        let dir = tempdir().unwrap();
        create_default_data_files(dir.path()).unwrap();

        let quests = load_quests(&dir.path().join(QUESTS_FILE)).unwrap();
        assert_eq!(quests.len(), 2);
        let intro = &quests["quest_intro"];
        assert_eq!(intro.reward_xp, 50);
        assert_eq!(intro.reward_gold, 20);
        assert_eq!(intro.required_level, 1);
        assert_eq!(intro.prerequisite, None);
        let hunt = &quests["quest_hunt_goblins"];
        assert_eq!(hunt.prerequisite.as_deref(), Some("quest_intro"));

        let items = load_items(&dir.path().join(ITEMS_FILE)).unwrap();
        assert_eq!(items.len(), 3);
        let sword = &items["sword_basic"];
        assert_eq!(sword.kind, ItemKind::Weapon);
        assert_eq!(sword.effect, Effect::new(StatKind::Strength, 5));
        assert_eq!(sword.cost, 100);
    }

    #[test]
    fn bootstrap_does_not_clobber_existing_files() {
        let dir = tempdir().unwrap();
        let quests_path = dir.path().join(QUESTS_FILE);
        fs::write(
            &quests_path,
            "ID: custom\nTITLE: Custom\nDESCRIPTION: d\nREWARD_XP: 1\nREWARD_GOLD: 1\nREQUIRED_LEVEL: 1\nPREREQUISITE: NONE\n",
        )
        .unwrap();

        create_default_data_files(dir.path()).unwrap();
        let quests = load_quests(&quests_path).unwrap();
        assert_eq!(quests.len(), 1);
        assert!(quests.contains_key("custom"));
    }

    #[test]
    fn keys_are_case_insensitive_and_whitespace_tolerant() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quests.txt");
        fs::write(
            &path,
            "id: q1\n  Title :  Spaced Out \ndescription: d\nreward_xp: 5\nreward_gold: 5\nrequired_level: 1\nprerequisite: None\n",
        )
        .unwrap();
        let quests = load_quests(&path).unwrap();
        assert_eq!(quests["q1"].title, "Spaced Out");
        assert_eq!(quests["q1"].prerequisite, None);
    }

    #[test]
    fn missing_file_and_missing_keys_are_distinct_errors() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("nope.txt");
        assert!(matches!(
            load_quests(&absent),
            Err(DataError::MissingFile(_))
        ));

        let path = dir.path().join("quests.txt");
        fs::write(&path, "ID: q1\nTITLE: t\n").unwrap();
        match load_quests(&path) {
            Err(DataError::InvalidFormat { reason, .. }) => {
                assert!(reason.contains("DESCRIPTION") || reason.contains("required key"));
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn malformed_lines_are_rejected_with_a_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.txt");
        fs::write(&path, "ID: x\nthis line has no separator\n").unwrap();
        match load_items(&path) {
            Err(DataError::InvalidFormat { reason, .. }) => {
                assert!(reason.contains("line 2"));
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn unknown_stats_and_kinds_fail_at_load_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.txt");
        fs::write(
            &path,
            "ID: amulet\nNAME: Amulet\nTYPE: trinket\nEFFECT: luck:5\nCOST: 10\nDESCRIPTION: d\n",
        )
        .unwrap();
        assert!(matches!(
            load_items(&path),
            Err(DataError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn dangling_prerequisites_fail_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quests.txt");
        fs::write(
            &path,
            "ID: q1\nTITLE: t\nDESCRIPTION: d\nREWARD_XP: 5\nREWARD_GOLD: 5\nREQUIRED_LEVEL: 1\nPREREQUISITE: ghost\n",
        )
        .unwrap();
        match load_quests(&path) {
            Err(DataError::InvalidFormat { reason, .. }) => {
                assert!(reason.contains("ghost"));
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }
}
