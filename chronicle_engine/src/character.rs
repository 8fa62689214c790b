//! Character record and stat mutation primitives.
//!
//! Every stat change in the game — battle rewards, quest rewards, consumable
//! effects, equipment bonuses — flows through the methods here, so the
//! invariants (health never above max, gold never negative, experience kept
//! below the level threshold) live in exactly one place.

use std::cmp;
use std::fmt;
use std::str::FromStr;

use chronicle_data::{Effect, Id, StatKind};
use log::info;
use thiserror::Error;

/// Experience needed to go from `level` to `level + 1`.
fn xp_threshold(level: u32) -> i64 {
    i64::from(level) * 100
}

/// The four playable archetypes, each with fixed base stats.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassArchetype {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

impl ClassArchetype {
    pub const ALL: [ClassArchetype; 4] = [
        ClassArchetype::Warrior,
        ClassArchetype::Mage,
        ClassArchetype::Rogue,
        ClassArchetype::Cleric,
    ];

    /// Base (health, strength, magic) for a fresh level-1 character.
    pub fn base_stats(self) -> (i64, i64, i64) {
        match self {
            ClassArchetype::Warrior => (120, 15, 5),
            ClassArchetype::Mage => (90, 8, 20),
            ClassArchetype::Rogue => (100, 12, 10),
            ClassArchetype::Cleric => (110, 10, 15),
        }
    }

    /// Display name of this class's once-per-battle special ability.
    pub fn ability_name(self) -> &'static str {
        match self {
            ClassArchetype::Warrior => "Power Strike",
            ClassArchetype::Mage => "Fireball",
            ClassArchetype::Rogue => "Critical Strike",
            ClassArchetype::Cleric => "Heal",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassArchetype::Warrior => "Warrior",
            ClassArchetype::Mage => "Mage",
            ClassArchetype::Rogue => "Rogue",
            ClassArchetype::Cleric => "Cleric",
        }
    }
}

impl fmt::Display for ClassArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassArchetype {
    type Err = CharacterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warrior" => Ok(ClassArchetype::Warrior),
            "mage" => Ok(ClassArchetype::Mage),
            "rogue" => Ok(ClassArchetype::Rogue),
            "cleric" => Ok(ClassArchetype::Cleric),
            other => Err(CharacterError::InvalidClass(other.to_string())),
        }
    }
}

/// An item occupying an equipment slot, along with the bonus it applied when
/// it was equipped (kept so the bonus can be reversed on unequip).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquippedItem {
    pub item_id: Id,
    pub bonus: Effect,
}

/// Failures raised by the character stat primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("character is dead and cannot act")]
    Dead,
    #[error("gold cannot go negative (have {have}, change {change})")]
    NegativeGold { have: i64, change: i64 },
    #[error("invalid character class '{0}'")]
    InvalidClass(String),
}

/// The mutable player record. Lives for a whole session; serialized to a
/// save file by [`crate::save_files`]. Equipment slots and the two battle
/// flags are transient and not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    pub class: ClassArchetype,
    pub level: u32,
    pub health: i64,
    pub max_health: i64,
    pub strength: i64,
    pub magic: i64,
    pub experience: i64,
    pub gold: i64,
    pub inventory: Vec<Id>,
    pub active_quests: Vec<Id>,
    pub completed_quests: Vec<Id>,
    pub equipped_weapon: Option<EquippedItem>,
    pub equipped_armor: Option<EquippedItem>,
    pub in_battle: bool,
    pub ability_on_cooldown: bool,
}

impl Character {
    /// Create a fresh level-1 character with the class's base stats,
    /// 100 starting gold, and empty inventory and quest logs.
    pub fn new(name: impl Into<String>, class: ClassArchetype) -> Self {
        let (health, strength, magic) = class.base_stats();
        Self {
            name: name.into(),
            class,
            level: 1,
            health,
            max_health: health,
            strength,
            magic,
            experience: 0,
            gold: 100,
            inventory: Vec::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            in_battle: false,
            ability_on_cooldown: false,
        }
    }

    /// Whether the character's health has hit zero.
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Add experience, cascading through as many level-ups as the total
    /// supports. Each level-up consumes `level * 100` experience (threshold
    /// recomputed with the new level every iteration), grants +10 max health
    /// and +2 strength and magic, and restores health to the new maximum.
    ///
    /// Returns the number of levels gained.
    ///
    /// # Errors
    /// [`CharacterError::Dead`] if the character's health is zero.
    pub fn gain_experience(&mut self, xp: i64) -> Result<u32, CharacterError> {
        if self.is_dead() {
            return Err(CharacterError::Dead);
        }

        self.experience += xp;

        let mut levels_gained = 0;
        while self.experience >= xp_threshold(self.level) {
            self.experience -= xp_threshold(self.level);
            self.level += 1;
            self.max_health += 10;
            self.strength += 2;
            self.magic += 2;
            self.health = self.max_health;
            levels_gained += 1;
            info!("{} reached level {}", self.name, self.level);
        }

        Ok(levels_gained)
    }

    /// Adjust gold by `amount` (negative to spend) and return the new total.
    ///
    /// # Errors
    /// [`CharacterError::NegativeGold`] if the result would be negative; the
    /// balance is left untouched in that case.
    pub fn add_gold(&mut self, amount: i64) -> Result<i64, CharacterError> {
        let new_total = self.gold + amount;
        if new_total < 0 {
            return Err(CharacterError::NegativeGold {
                have: self.gold,
                change: amount,
            });
        }
        self.gold = new_total;
        Ok(new_total)
    }

    /// Heal up to `amount`, never past max health. Returns the amount
    /// actually restored (zero for a non-positive amount or a full character).
    pub fn heal(&mut self, amount: i64) -> i64 {
        if amount <= 0 {
            return 0;
        }
        let missing = self.max_health - self.health;
        if missing <= 0 {
            return 0;
        }
        let healed = cmp::min(amount, missing);
        self.health += healed;
        healed
    }

    /// Bring a dead character back at half max health (at least 1).
    /// Returns false without changes if the character is still alive.
    pub fn revive(&mut self) -> bool {
        if self.health > 0 {
            return false;
        }
        self.health = cmp::max(1, self.max_health / 2);
        info!("{} was revived at {} hp", self.name, self.health);
        true
    }

    /// Apply a parsed item effect. Health gains clamp at max health;
    /// max-health losses drag current health down with them; strength and
    /// magic apply unclamped.
    pub fn apply_effect(&mut self, effect: &Effect) {
        match effect.stat {
            StatKind::Health => {
                self.health += effect.amount;
                if self.health > self.max_health {
                    self.health = self.max_health;
                }
            }
            StatKind::MaxHealth => {
                self.max_health += effect.amount;
                if self.health > self.max_health {
                    self.health = self.max_health;
                }
            }
            StatKind::Strength => self.strength += effect.amount,
            StatKind::Magic => self.magic += effect.amount,
        }
    }
}
