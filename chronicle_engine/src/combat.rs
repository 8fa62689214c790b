//! Turn-based combat engine.
//!
//! A [`Battle`] exclusively borrows the character for its whole lifetime, so
//! nothing else can mutate the record while combat is active — the exclusivity
//! the in-battle flag tracks is also enforced by the borrow checker.
//!
//! Turn order each round: player, end check, enemy, end check. The enemy is
//! checked first, so simultaneous zero health resolves as a player win.

use std::cmp;
use std::fmt;

use log::info;
use rand::Rng;
use thiserror::Error;

use crate::character::{Character, CharacterError, ClassArchetype};

/// Failures raised by battle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("character is dead and cannot fight")]
    CharacterDead,
    #[error("combat is not active")]
    NotActive,
    #[error("special ability already used this battle")]
    AbilityOnCooldown,
    #[error("unknown enemy type '{0}'")]
    UnknownEnemy(String),
    #[error(transparent)]
    Character(#[from] CharacterError),
}

/// The three enemy templates, in ascending threat order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnemyKind {
    Goblin,
    Orc,
    Dragon,
}

impl EnemyKind {
    /// Look up a template by key, case-insensitively.
    ///
    /// # Errors
    /// [`CombatError::UnknownEnemy`] for anything but goblin/orc/dragon.
    pub fn from_key(key: &str) -> Result<Self, CombatError> {
        match key.trim().to_lowercase().as_str() {
            "goblin" => Ok(EnemyKind::Goblin),
            "orc" => Ok(EnemyKind::Orc),
            "dragon" => Ok(EnemyKind::Dragon),
            other => Err(CombatError::UnknownEnemy(other.to_string())),
        }
    }

    /// Level-banded encounter selection: 1-2 goblins, 3-5 orcs, 6+ dragons.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => EnemyKind::Goblin,
            3..=5 => EnemyKind::Orc,
            _ => EnemyKind::Dragon,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Goblin => "Goblin",
            EnemyKind::Orc => "Orc",
            EnemyKind::Dragon => "Dragon",
        }
    }

    /// Instantiate a fresh enemy from this template.
    pub fn spawn(self) -> Enemy {
        // (health, strength, magic, xp_reward, gold_reward)
        let (health, strength, magic, xp_reward, gold_reward) = match self {
            EnemyKind::Goblin => (50, 8, 2, 25, 10),
            EnemyKind::Orc => (80, 12, 5, 50, 25),
            EnemyKind::Dragon => (200, 25, 15, 200, 100),
        };
        Enemy {
            kind: self,
            name: self.name(),
            health,
            max_health: health,
            strength,
            magic,
            xp_reward,
            gold_reward,
        }
    }
}

/// A per-encounter opponent. Never persisted; lives only as long as one
/// battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub name: &'static str,
    pub health: i64,
    pub max_health: i64,
    pub strength: i64,
    pub magic: i64,
    pub xp_reward: i64,
    pub gold_reward: i64,
}

/// Who won a finished battle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Winner {
    Player,
    Enemy,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player => f.write_str("player"),
            Winner::Enemy => f.write_str("enemy"),
        }
    }
}

/// Outcome summary returned when a battle resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub winner: Winner,
    pub xp_gained: i64,
    pub gold_gained: i64,
    pub rounds: u32,
}

/// Damage dealt by an attacker with `attacker_strength` against a defender
/// with `defender_strength`: strength minus a quarter of the defense,
/// never below 1.
pub fn calculate_damage(attacker_strength: i64, defender_strength: i64) -> i64 {
    cmp::max(1, attacker_strength - defender_strength / 4)
}

/// Whether the character is in any condition to start a battle: alive and
/// not already fighting.
pub fn can_fight(character: &Character) -> bool {
    !character.is_dead() && !character.in_battle
}

fn apply_damage(health: &mut i64, damage: i64) {
    *health = cmp::max(0, *health - damage);
}

/// One turn-based battle between the character and a single enemy.
///
/// Construction marks the character as in battle and clears the special
/// ability cooldown for this encounter. Either drive the turns yourself (as
/// the interactive menu does) or call [`Battle::run`] to auto-resolve with
/// basic attacks.
#[derive(Debug)]
pub struct Battle<'a> {
    character: &'a mut Character,
    enemy: Enemy,
    active: bool,
    round: u32,
}

impl<'a> Battle<'a> {
    pub fn new(character: &'a mut Character, enemy: Enemy) -> Self {
        character.in_battle = true;
        character.ability_on_cooldown = false;
        Self {
            character,
            enemy,
            active: true,
            round: 1,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn character(&self) -> &Character {
        self.character
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    /// Auto-resolve the battle with basic attacks on both sides.
    ///
    /// On a player win, the enemy's configured yields are applied through the
    /// character's experience/gold primitives (so level-up cascades happen
    /// here too). A loss changes nothing.
    ///
    /// # Errors
    /// [`CombatError::CharacterDead`] if the character is dead before any
    /// turn is taken.
    pub fn run(&mut self) -> Result<BattleReport, CombatError> {
        if self.character.is_dead() {
            return Err(CombatError::CharacterDead);
        }

        info!("battle begins: {} vs {}", self.character.name, self.enemy.name);

        let winner = loop {
            let line = self.player_turn()?;
            info!("{line}");
            if let Some(winner) = self.check_battle_end() {
                break winner;
            }

            let line = self.enemy_turn()?;
            info!("{line}");
            if let Some(winner) = self.check_battle_end() {
                break winner;
            }

            self.round += 1;
        };

        self.finish(winner)
    }

    /// The player's basic attack. Returns a narration line.
    ///
    /// # Errors
    /// [`CombatError::NotActive`] outside an active battle.
    pub fn player_turn(&mut self) -> Result<String, CombatError> {
        if !self.active {
            return Err(CombatError::NotActive);
        }
        let damage = calculate_damage(self.character.strength, self.enemy.strength);
        apply_damage(&mut self.enemy.health, damage);
        Ok(format!(
            "{} attacks {} for {damage} damage!",
            self.character.name, self.enemy.name
        ))
    }

    /// The enemy's turn: always a basic attack.
    ///
    /// # Errors
    /// [`CombatError::NotActive`] outside an active battle.
    pub fn enemy_turn(&mut self) -> Result<String, CombatError> {
        if !self.active {
            return Err(CombatError::NotActive);
        }
        let damage = calculate_damage(self.enemy.strength, self.character.strength);
        apply_damage(&mut self.character.health, damage);
        Ok(format!(
            "{} attacks {} for {damage} damage!",
            self.enemy.name, self.character.name
        ))
    }

    /// Check for a finished battle. The enemy is tested first, so if both
    /// sides are at zero the player takes the win. Resolving clears the
    /// combat-active and in-battle flags immediately.
    pub fn check_battle_end(&mut self) -> Option<Winner> {
        if self.enemy.health <= 0 {
            self.active = false;
            self.character.in_battle = false;
            Some(Winner::Player)
        } else if self.character.health <= 0 {
            self.active = false;
            self.character.in_battle = false;
            Some(Winner::Enemy)
        } else {
            None
        }
    }

    /// Try to flee: an even coin flip. Success ends the battle with no winner
    /// and no rewards; failure leaves everything as it was.
    ///
    /// # Errors
    /// [`CombatError::NotActive`] outside an active battle.
    pub fn attempt_escape(&mut self, rng: &mut impl Rng) -> Result<bool, CombatError> {
        if !self.active {
            return Err(CombatError::NotActive);
        }
        let escaped = rng.random_bool(0.5);
        if escaped {
            self.active = false;
            self.character.in_battle = false;
            info!("{} escaped from {}", self.character.name, self.enemy.name);
        }
        Ok(escaped)
    }

    /// Use the character's class special ability. One use per battle,
    /// whatever the result.
    ///
    /// # Errors
    /// [`CombatError::AbilityOnCooldown`] if already used this battle.
    pub fn use_special_ability(&mut self, rng: &mut impl Rng) -> Result<String, CombatError> {
        if self.character.ability_on_cooldown {
            return Err(CombatError::AbilityOnCooldown);
        }
        self.character.ability_on_cooldown = true;

        let line = match self.character.class {
            ClassArchetype::Warrior => {
                let damage = cmp::max(1, self.character.strength * 2);
                apply_damage(&mut self.enemy.health, damage);
                format!("Power Strike hits {} for {damage} damage!", self.enemy.name)
            }
            ClassArchetype::Mage => {
                let damage = cmp::max(1, self.character.magic * 2);
                apply_damage(&mut self.enemy.health, damage);
                format!("Fireball scorches {} for {damage} damage!", self.enemy.name)
            }
            ClassArchetype::Rogue => {
                if rng.random_bool(0.5) {
                    let damage = cmp::max(1, self.character.strength * 3);
                    apply_damage(&mut self.enemy.health, damage);
                    format!("Critical Strike lands on {} for {damage} damage!", self.enemy.name)
                } else {
                    let damage = cmp::max(1, self.character.strength);
                    apply_damage(&mut self.enemy.health, damage);
                    format!("The strike glances off {} for {damage} damage (no crit).", self.enemy.name)
                }
            }
            ClassArchetype::Cleric => {
                let healed = self.character.heal(30);
                format!("A healing prayer restores {healed} health!")
            }
        };
        Ok(line)
    }

    /// Settle a decided battle: clear flags and, on a player win, pay out the
    /// enemy's xp/gold yields through the character primitives.
    ///
    /// # Errors
    /// Propagates failures from the reward primitives.
    pub fn finish(&mut self, winner: Winner) -> Result<BattleReport, CombatError> {
        self.active = false;
        self.character.in_battle = false;

        match winner {
            Winner::Player => {
                let xp = self.enemy.xp_reward;
                let gold = self.enemy.gold_reward;
                self.character.gain_experience(xp)?;
                self.character.add_gold(gold)?;
                info!(
                    "{} defeated {}: +{xp} xp, +{gold} gold",
                    self.character.name, self.enemy.name
                );
                Ok(BattleReport {
                    winner,
                    xp_gained: xp,
                    gold_gained: gold,
                    rounds: self.round,
                })
            }
            Winner::Enemy => {
                info!("{} was defeated by {}", self.character.name, self.enemy.name);
                Ok(BattleReport {
                    winner,
                    xp_gained: 0,
                    gold_gained: 0,
                    rounds: self.round,
                })
            }
        }
    }
}
