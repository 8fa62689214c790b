use std::collections::HashMap;

use thiserror::Error;

use crate::{Id, Quest};

/// Validation error for malformed references in a quest catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("quest '{quest_id}' lists unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite { quest_id: Id, prerequisite: Id },
    #[error("quest '{0}' lists itself as its own prerequisite")]
    SelfPrerequisite(Id),
}

/// Check that every non-`None` prerequisite in the catalog refers to a real
/// quest other than the one declaring it. Returns all problems found; an
/// empty vec means the catalog is internally consistent.
pub fn validate_quest_catalog(quests: &HashMap<Id, Quest>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (quest_id, quest) in quests {
        let Some(prereq) = &quest.prerequisite else {
            continue;
        };
        if prereq == quest_id {
            errors.push(ValidationError::SelfPrerequisite(quest_id.clone()));
        } else if !quests.contains_key(prereq) {
            errors.push(ValidationError::UnknownPrerequisite {
                quest_id: quest_id.clone(),
                prerequisite: prereq.clone(),
            });
        }
    }
    errors.sort_by(|a, b| format!("{a}").cmp(&format!("{b}")));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest(id: &str, prerequisite: Option<&str>) -> Quest {
        Quest {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            reward_xp: 0,
            reward_gold: 0,
            required_level: 1,
            prerequisite: prerequisite.map(Into::into),
        }
    }

    #[test]
    fn accepts_linked_catalog() {
        let mut quests = HashMap::new();
        quests.insert("a".to_string(), quest("a", None));
        quests.insert("b".to_string(), quest("b", Some("a")));
        assert!(validate_quest_catalog(&quests).is_empty());
    }

    #[test]
    fn reports_dangling_and_self_prerequisites() {
        let mut quests = HashMap::new();
        quests.insert("a".to_string(), quest("a", Some("missing")));
        quests.insert("b".to_string(), quest("b", Some("b")));
        let errors = validate_quest_catalog(&quests);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownPrerequisite { quest_id, .. } if quest_id == "a"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SelfPrerequisite(id) if id == "b")));
    }
}
