//! Quest acceptance, completion, and progression tracking.
//!
//! The quest catalog is read-only for the whole session; all state lives on
//! the character's active/completed lists. Acceptance checks run in a fixed
//! order so the surfaced error is stable: existence, level, already
//! completed, already active, prerequisite.

use std::collections::{HashMap, HashSet};

use chronicle_data::{Id, Quest};
use log::info;
use thiserror::Error;

use crate::character::{Character, CharacterError};

/// Failures raised by quest operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("quest '{0}' does not exist")]
    NotFound(Id),
    #[error("quest '{quest_id}' requires level {required}")]
    InsufficientLevel { quest_id: Id, required: u32 },
    #[error("quest '{0}' has already been completed")]
    AlreadyCompleted(Id),
    #[error("requirements for quest '{quest_id}' are not met: {reason}")]
    RequirementsNotMet { quest_id: Id, reason: String },
    #[error("quest '{0}' is not active")]
    NotActive(Id),
    #[error("prerequisite chain for quest '{0}' loops back on itself")]
    CyclicPrerequisite(Id),
    #[error(transparent)]
    Character(#[from] CharacterError),
}

/// Rewards paid out by a completed quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestReward {
    pub quest_id: Id,
    pub xp: i64,
    pub gold: i64,
}

/// Aggregate rewards already earned from completed quests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardTotals {
    pub xp: i64,
    pub gold: i64,
}

pub fn is_quest_active(character: &Character, quest_id: &str) -> bool {
    character.active_quests.iter().any(|id| id == quest_id)
}

pub fn is_quest_completed(character: &Character, quest_id: &str) -> bool {
    character.completed_quests.iter().any(|id| id == quest_id)
}

/// Add a quest to the character's active list.
///
/// # Errors
/// In check order: [`QuestError::NotFound`], [`QuestError::InsufficientLevel`],
/// [`QuestError::AlreadyCompleted`], then [`QuestError::RequirementsNotMet`]
/// for an already-active quest or an uncompleted prerequisite.
pub fn accept_quest(
    character: &mut Character,
    quest_id: &str,
    quests: &HashMap<Id, Quest>,
) -> Result<(), QuestError> {
    let quest = quests
        .get(quest_id)
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))?;

    if character.level < quest.required_level {
        return Err(QuestError::InsufficientLevel {
            quest_id: quest_id.to_string(),
            required: quest.required_level,
        });
    }
    if is_quest_completed(character, quest_id) {
        return Err(QuestError::AlreadyCompleted(quest_id.to_string()));
    }
    if is_quest_active(character, quest_id) {
        return Err(QuestError::RequirementsNotMet {
            quest_id: quest_id.to_string(),
            reason: "quest is already active".to_string(),
        });
    }
    if let Some(prereq) = &quest.prerequisite
        && !is_quest_completed(character, prereq)
    {
        return Err(QuestError::RequirementsNotMet {
            quest_id: quest_id.to_string(),
            reason: format!("prerequisite '{prereq}' is not completed"),
        });
    }

    character.active_quests.push(quest_id.to_string());
    info!("{} accepted quest '{quest_id}'", character.name);
    Ok(())
}

/// Pure mirror of [`accept_quest`]'s checks; never errors. Used to build
/// "available quest" listings.
pub fn can_accept_quest(
    character: &Character,
    quest_id: &str,
    quests: &HashMap<Id, Quest>,
) -> bool {
    let Some(quest) = quests.get(quest_id) else {
        return false;
    };
    if character.level < quest.required_level
        || is_quest_completed(character, quest_id)
        || is_quest_active(character, quest_id)
    {
        return false;
    }
    match &quest.prerequisite {
        Some(prereq) => is_quest_completed(character, prereq),
        None => true,
    }
}

/// Complete an active quest: pay out its rewards through the character
/// primitives (level-up cascades included), then move it from the active to
/// the completed list (no duplicate completed entries).
///
/// # Errors
/// [`QuestError::NotFound`], [`QuestError::NotActive`], or a propagated
/// [`CharacterError`] from the reward payout — in which case the quest lists
/// are left untouched.
pub fn complete_quest(
    character: &mut Character,
    quest_id: &str,
    quests: &HashMap<Id, Quest>,
) -> Result<QuestReward, QuestError> {
    let quest = quests
        .get(quest_id)
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))?;

    if !is_quest_active(character, quest_id) {
        return Err(QuestError::NotActive(quest_id.to_string()));
    }

    character.gain_experience(quest.reward_xp)?;
    character.add_gold(quest.reward_gold)?;

    character.active_quests.retain(|id| id != quest_id);
    if !is_quest_completed(character, quest_id) {
        character.completed_quests.push(quest_id.to_string());
    }

    info!(
        "{} completed quest '{quest_id}': +{} xp, +{} gold",
        character.name, quest.reward_xp, quest.reward_gold
    );
    Ok(QuestReward {
        quest_id: quest_id.to_string(),
        xp: quest.reward_xp,
        gold: quest.reward_gold,
    })
}

/// Drop a quest from the active list with no reward and no completion record.
///
/// # Errors
/// [`QuestError::NotActive`] if the quest is not currently active.
pub fn abandon_quest(character: &mut Character, quest_id: &str) -> Result<(), QuestError> {
    if !is_quest_active(character, quest_id) {
        return Err(QuestError::NotActive(quest_id.to_string()));
    }
    character.active_quests.retain(|id| id != quest_id);
    info!("{} abandoned quest '{quest_id}'", character.name);
    Ok(())
}

/// Catalog entries for the character's active quests, in acceptance order.
/// Ids missing from the catalog are skipped.
pub fn active_quests<'q>(character: &Character, quests: &'q HashMap<Id, Quest>) -> Vec<&'q Quest> {
    character
        .active_quests
        .iter()
        .filter_map(|id| quests.get(id))
        .collect()
}

/// Catalog entries for the character's completed quests, in completion order.
pub fn completed_quests<'q>(
    character: &Character,
    quests: &'q HashMap<Id, Quest>,
) -> Vec<&'q Quest> {
    character
        .completed_quests
        .iter()
        .filter_map(|id| quests.get(id))
        .collect()
}

/// Every quest the character could accept right now, sorted by required
/// level then id for stable display.
pub fn available_quests<'q>(
    character: &Character,
    quests: &'q HashMap<Id, Quest>,
) -> Vec<&'q Quest> {
    let mut available: Vec<&Quest> = quests
        .values()
        .filter(|quest| can_accept_quest(character, &quest.id, quests))
        .collect();
    available.sort_by(|a, b| a.required_level.cmp(&b.required_level).then(a.id.cmp(&b.id)));
    available
}

/// All quests whose required level falls in `min..=max`, sorted like
/// [`available_quests`].
pub fn quests_by_level<'q>(quests: &'q HashMap<Id, Quest>, min: u32, max: u32) -> Vec<&'q Quest> {
    let mut in_range: Vec<&Quest> = quests
        .values()
        .filter(|quest| (min..=max).contains(&quest.required_level))
        .collect();
    in_range.sort_by(|a, b| a.required_level.cmp(&b.required_level).then(a.id.cmp(&b.id)));
    in_range
}

/// Walk the prerequisite links backward from `quest_id` and return the chain
/// ordered from the earliest ancestor to the quest itself.
///
/// # Errors
/// [`QuestError::NotFound`] if any link is missing from the catalog, or
/// [`QuestError::CyclicPrerequisite`] if the links revisit a quest (malformed
/// catalog data; detected with a visited set rather than looping forever).
pub fn prerequisite_chain(
    quest_id: &str,
    quests: &HashMap<Id, Quest>,
) -> Result<Vec<Id>, QuestError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = quest_id.to_string();

    loop {
        let quest = quests
            .get(&current)
            .ok_or_else(|| QuestError::NotFound(current.clone()))?;
        if !visited.insert(current.clone()) {
            return Err(QuestError::CyclicPrerequisite(current));
        }
        chain.push(current.clone());

        match &quest.prerequisite {
            Some(prereq) => current = prereq.clone(),
            None => break,
        }
    }

    chain.reverse();
    Ok(chain)
}

/// Share of the catalog the character has completed, as a percentage.
/// Completed ids absent from the catalog are skipped; an empty catalog is 0%.
pub fn completion_percentage(character: &Character, quests: &HashMap<Id, Quest>) -> f64 {
    if quests.is_empty() {
        return 0.0;
    }
    let completed = character
        .completed_quests
        .iter()
        .filter(|id| quests.contains_key(*id))
        .count();
    #[allow(clippy::cast_precision_loss)]
    {
        (completed as f64 / quests.len() as f64) * 100.0
    }
}

/// Total xp and gold earned across completed quests still in the catalog.
pub fn total_rewards_earned(character: &Character, quests: &HashMap<Id, Quest>) -> RewardTotals {
    let mut totals = RewardTotals::default();
    for id in &character.completed_quests {
        if let Some(quest) = quests.get(id) {
            totals.xp += quest.reward_xp;
            totals.gold += quest.reward_gold;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::ClassArchetype;

    fn quest(id: &str, required_level: u32, prerequisite: Option<&str>) -> Quest {
        Quest {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            reward_xp: 50,
            reward_gold: 20,
            required_level,
            prerequisite: prerequisite.map(Into::into),
        }
    }

    fn starter_catalog() -> HashMap<Id, Quest> {
        let mut quests = HashMap::new();
        quests.insert("quest_intro".to_string(), quest("quest_intro", 1, None));
        quests.insert(
            "quest_hunt_goblins".to_string(),
            quest("quest_hunt_goblins", 2, Some("quest_intro")),
        );
        quests
    }

    fn hero() -> Character {
        Character::new("Hero", ClassArchetype::Warrior)
    }

    #[test]
    fn acceptance_gates_fire_in_order() {
        let quests = starter_catalog();
        let mut c = hero();

        assert!(matches!(
            accept_quest(&mut c, "quest_missing", &quests),
            Err(QuestError::NotFound(_))
        ));

        // level 1: the level gate fires before the prerequisite gate
        assert_eq!(
            accept_quest(&mut c, "quest_hunt_goblins", &quests),
            Err(QuestError::InsufficientLevel {
                quest_id: "quest_hunt_goblins".to_string(),
                required: 2
            })
        );

        // level 2 without the prerequisite: requirements not met
        c.level = 2;
        assert!(matches!(
            accept_quest(&mut c, "quest_hunt_goblins", &quests),
            Err(QuestError::RequirementsNotMet { .. })
        ));

        // complete the prerequisite, then acceptance succeeds
        accept_quest(&mut c, "quest_intro", &quests).unwrap();
        complete_quest(&mut c, "quest_intro", &quests).unwrap();
        accept_quest(&mut c, "quest_hunt_goblins", &quests).unwrap();
        assert!(is_quest_active(&c, "quest_hunt_goblins"));

        // accepting again fails as requirements-not-met
        assert!(matches!(
            accept_quest(&mut c, "quest_hunt_goblins", &quests),
            Err(QuestError::RequirementsNotMet { .. })
        ));

        // completed quests cannot be re-accepted
        assert!(matches!(
            accept_quest(&mut c, "quest_intro", &quests),
            Err(QuestError::AlreadyCompleted(_))
        ));
    }

    #[test]
    fn completion_moves_quest_and_pays_rewards() {
        let quests = starter_catalog();
        let mut c = hero();
        accept_quest(&mut c, "quest_intro", &quests).unwrap();

        let reward = complete_quest(&mut c, "quest_intro", &quests).unwrap();
        assert_eq!(reward.xp, 50);
        assert_eq!(reward.gold, 20);
        assert_eq!(c.experience, 50);
        assert_eq!(c.gold, 120);
        assert!(!is_quest_active(&c, "quest_intro"));
        assert!(is_quest_completed(&c, "quest_intro"));
        assert_eq!(c.completed_quests.len(), 1);

        assert!(matches!(
            complete_quest(&mut c, "quest_intro", &quests),
            Err(QuestError::NotActive(_))
        ));
    }

    #[test]
    fn completing_while_dead_leaves_quest_lists_untouched() {
        let quests = starter_catalog();
        let mut c = hero();
        accept_quest(&mut c, "quest_intro", &quests).unwrap();
        c.health = 0;
        assert_eq!(
            complete_quest(&mut c, "quest_intro", &quests),
            Err(QuestError::Character(CharacterError::Dead))
        );
        assert!(is_quest_active(&c, "quest_intro"));
        assert!(c.completed_quests.is_empty());
    }

    #[test]
    fn abandoning_removes_without_reward() {
        let quests = starter_catalog();
        let mut c = hero();
        accept_quest(&mut c, "quest_intro", &quests).unwrap();
        abandon_quest(&mut c, "quest_intro").unwrap();
        assert!(c.active_quests.is_empty());
        assert!(c.completed_quests.is_empty());
        assert_eq!(c.experience, 0);
        assert!(matches!(
            abandon_quest(&mut c, "quest_intro"),
            Err(QuestError::NotActive(_))
        ));
    }

    #[test]
    fn availability_mirrors_acceptance() {
        let quests = starter_catalog();
        let mut c = hero();
        assert!(can_accept_quest(&c, "quest_intro", &quests));
        assert!(!can_accept_quest(&c, "quest_hunt_goblins", &quests));
        assert!(!can_accept_quest(&c, "quest_missing", &quests));

        let available = available_quests(&c, &quests);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "quest_intro");

        c.level = 2;
        accept_quest(&mut c, "quest_intro", &quests).unwrap();
        complete_quest(&mut c, "quest_intro", &quests).unwrap();
        let available = available_quests(&c, &quests);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "quest_hunt_goblins");
    }

    #[test]
    fn chain_runs_from_earliest_ancestor_to_target() {
        let mut quests = starter_catalog();
        quests.insert(
            "quest_dragon".to_string(),
            quest("quest_dragon", 6, Some("quest_hunt_goblins")),
        );
        let chain = prerequisite_chain("quest_dragon", &quests).unwrap();
        assert_eq!(chain, vec!["quest_intro", "quest_hunt_goblins", "quest_dragon"]);

        let single = prerequisite_chain("quest_intro", &quests).unwrap();
        assert_eq!(single, vec!["quest_intro"]);
    }

    #[test]
    fn chain_detects_missing_links_and_cycles() {
        let mut quests = HashMap::new();
        quests.insert("a".to_string(), quest("a", 1, Some("b")));
        assert!(matches!(
            prerequisite_chain("a", &quests),
            Err(QuestError::NotFound(id)) if id == "b"
        ));

        quests.insert("b".to_string(), quest("b", 1, Some("a")));
        assert!(matches!(
            prerequisite_chain("a", &quests),
            Err(QuestError::CyclicPrerequisite(_))
        ));
    }

    #[test]
    fn statistics_skip_ids_missing_from_the_catalog() {
        let quests = starter_catalog();
        let mut c = hero();
        c.completed_quests.push("quest_intro".to_string());
        c.completed_quests.push("quest_retired".to_string());

        assert!((completion_percentage(&c, &quests) - 50.0).abs() < f64::EPSILON);
        let totals = total_rewards_earned(&c, &quests);
        assert_eq!(totals, RewardTotals { xp: 50, gold: 20 });

        assert!((completion_percentage(&c, &HashMap::new())).abs() < f64::EPSILON);
    }

    #[test]
    fn level_range_listing_is_sorted() {
        let mut quests = starter_catalog();
        quests.insert("quest_dragon".to_string(), quest("quest_dragon", 6, None));
        let in_range = quests_by_level(&quests, 1, 5);
        assert_eq!(in_range.len(), 2);
        assert_eq!(in_range[0].id, "quest_intro");
        assert_eq!(in_range[1].id, "quest_hunt_goblins");
    }
}
