use chronicle_engine as ce;
use chronicle_engine::*;

#[test]
fn test_lib_version() {
    assert!(!ce::CHRONICLE_VERSION.is_empty());
}

#[test]
fn test_new_character_defaults() {
    let c = Character::new("Hero", ClassArchetype::Warrior);
    assert_eq!(c.level, 1);
    assert_eq!(c.gold, 100);
    assert_eq!((c.health, c.strength, c.magic), (120, 15, 5));
    assert!(!c.in_battle);
}

#[test]
fn test_damage_floor() {
    use ce::combat::calculate_damage;
    assert_eq!(calculate_damage(15, 8), 13);
    assert_eq!(calculate_damage(1, 100), 1);
}

#[test]
fn test_encounter_bands() {
    assert_eq!(EnemyKind::for_level(1), EnemyKind::Goblin);
    assert_eq!(EnemyKind::for_level(4), EnemyKind::Orc);
    assert_eq!(EnemyKind::for_level(9), EnemyKind::Dragon);
}

#[test]
fn test_effect_parsing() {
    use chronicle_data::{Effect, StatKind};
    let effect: Effect = "strength:+5".parse().unwrap();
    assert_eq!(effect.stat, StatKind::Strength);
    assert_eq!(effect.amount, 5);
    assert!("luck:5".parse::<Effect>().is_err());
}

#[test]
fn test_inventory_cap() {
    use ce::inventory::{self, MAX_INVENTORY_SIZE};
    let mut c = Character::new("Packrat", ClassArchetype::Rogue);
    for n in 0..MAX_INVENTORY_SIZE {
        inventory::add_item(&mut c, &format!("pebble_{n}")).unwrap();
    }
    assert!(inventory::add_item(&mut c, "straw").is_err());
}

#[test]
fn test_quest_error_display() {
    let err = QuestError::NotFound("quest_lost".to_string());
    assert!(err.to_string().contains("quest_lost"));
}

#[test]
fn test_starter_data_loads() {
    use ce::loader::{create_default_data_files, load_items, load_quests};
    let dir = tempfile::tempdir().unwrap();
    create_default_data_files(dir.path()).unwrap();
    let quests = load_quests(&dir.path().join("quests.txt")).unwrap();
    let items = load_items(&dir.path().join("items.txt")).unwrap();
    assert_eq!(quests.len(), 2);
    assert_eq!(items.len(), 3);
}
