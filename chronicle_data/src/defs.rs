use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Stable identifier used across catalog references.
pub type Id = String;

/// A quest as authored in `quests.txt`.
///
/// `prerequisite` is `None` when the file says `PREREQUISITE: NONE`; otherwise
/// it names another quest that must be completed before this one can be
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quest {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub reward_xp: i64,
    pub reward_gold: i64,
    pub required_level: u32,
    pub prerequisite: Option<Id>,
}

/// An item as authored in `items.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Id,
    pub name: String,
    pub kind: ItemKind,
    pub effect: Effect,
    pub cost: i64,
    pub description: String,
}

/// What an item is for: equipment slots or one-shot consumption.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Weapon,
    Armor,
    Consumable,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
            ItemKind::Consumable => "consumable",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = EffectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(ItemKind::Weapon),
            "armor" => Ok(ItemKind::Armor),
            "consumable" => Ok(ItemKind::Consumable),
            other => Err(EffectParseError::UnknownItemKind(other.to_string())),
        }
    }
}

/// Character stat an item effect can touch.
///
/// A closed set: unknown stat names are rejected when the catalog is loaded
/// rather than materialized as ad-hoc fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatKind {
    Health,
    MaxHealth,
    Strength,
    Magic,
}

impl StatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatKind::Health => "health",
            StatKind::MaxHealth => "max_health",
            StatKind::Strength => "strength",
            StatKind::Magic => "magic",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = EffectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "health" => Ok(StatKind::Health),
            "max_health" => Ok(StatKind::MaxHealth),
            "strength" => Ok(StatKind::Strength),
            "magic" => Ok(StatKind::Magic),
            other => Err(EffectParseError::UnknownStat(other.to_string())),
        }
    }
}

/// A single stat delta, parsed once from the `"stat:delta"` effect string in
/// the item file (e.g. `"strength:+5"` or `"health:20"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub stat: StatKind,
    pub amount: i64,
}

impl Effect {
    pub fn new(stat: StatKind, amount: i64) -> Self {
        Self { stat, amount }
    }

    /// The inverse effect, used when unequipping to take a bonus back off.
    pub fn reversed(self) -> Self {
        Self {
            stat: self.stat,
            amount: -self.amount,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.stat, self.amount)
    }
}

impl FromStr for Effect {
    type Err = EffectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stat, amount) = s
            .split_once(':')
            .ok_or_else(|| EffectParseError::MissingSeparator(s.to_string()))?;
        let stat = stat.parse::<StatKind>()?;
        let amount = amount
            .trim()
            .parse::<i64>()
            .map_err(|_| EffectParseError::BadAmount(s.to_string()))?;
        Ok(Effect { stat, amount })
    }
}

/// Problems turning authored effect/type strings into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectParseError {
    #[error("effect '{0}' is not in 'stat:amount' form")]
    MissingSeparator(String),
    #[error("unknown stat name '{0}'")]
    UnknownStat(String),
    #[error("effect '{0}' has a non-integer amount")]
    BadAmount(String),
    #[error("unknown item type '{0}'")]
    UnknownItemKind(String),
}
