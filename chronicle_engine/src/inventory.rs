//! Inventory, equipment slots, consumables, and shop arithmetic.
//!
//! The inventory is a bounded, ordered list of item ids (duplicates allowed).
//! Equipment slots hold one item each along with the stat bonus it applied,
//! so unequipping can take the bonus back off exactly.

use chronicle_data::{Id, Item, ItemKind};
use log::info;
use thiserror::Error;

use crate::character::{Character, EquippedItem};

/// Hard cap on the number of items a character can carry.
pub const MAX_INVENTORY_SIZE: usize = 20;

/// Failures raised by inventory, equipment, and shop operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("inventory is full")]
    Full,
    #[error("item '{0}' is not in the inventory")]
    NotFound(Id),
    #[error("item '{item_id}' is a {kind}, not a {expected}")]
    InvalidKind {
        item_id: Id,
        kind: ItemKind,
        expected: ItemKind,
    },
    #[error("not enough gold: need {cost}, have {gold}")]
    InsufficientGold { cost: i64, gold: i64 },
}

/// Equipment attachment points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum EquipSlot {
    Weapon,
    Armor,
}

impl EquipSlot {
    fn kind(self) -> ItemKind {
        match self {
            EquipSlot::Weapon => ItemKind::Weapon,
            EquipSlot::Armor => ItemKind::Armor,
        }
    }
}

pub fn has_item(character: &Character, item_id: &str) -> bool {
    character.inventory.iter().any(|id| id == item_id)
}

pub fn count_item(character: &Character, item_id: &str) -> usize {
    character.inventory.iter().filter(|id| *id == item_id).count()
}

pub fn space_remaining(character: &Character) -> usize {
    MAX_INVENTORY_SIZE.saturating_sub(character.inventory.len())
}

/// Append an item id to the inventory.
///
/// # Errors
/// [`InventoryError::Full`] at capacity; the inventory is unchanged.
pub fn add_item(character: &mut Character, item_id: &str) -> Result<(), InventoryError> {
    if character.inventory.len() >= MAX_INVENTORY_SIZE {
        return Err(InventoryError::Full);
    }
    character.inventory.push(item_id.to_string());
    Ok(())
}

/// Remove one occurrence of an item id.
///
/// # Errors
/// [`InventoryError::NotFound`] if the id is absent.
pub fn remove_item(character: &mut Character, item_id: &str) -> Result<(), InventoryError> {
    let position = character
        .inventory
        .iter()
        .position(|id| id == item_id)
        .ok_or_else(|| InventoryError::NotFound(item_id.to_string()))?;
    character.inventory.remove(position);
    Ok(())
}

/// Empty the inventory, returning everything that was in it.
pub fn clear_inventory(character: &mut Character) -> Vec<Id> {
    std::mem::take(&mut character.inventory)
}

/// Consume one unit of a consumable item, applying its effect.
///
/// # Errors
/// [`InventoryError::NotFound`] if the item is not carried, or
/// [`InventoryError::InvalidKind`] for weapons and armor (those are equipped,
/// not used).
pub fn use_item(character: &mut Character, item: &Item) -> Result<String, InventoryError> {
    if !has_item(character, &item.id) {
        return Err(InventoryError::NotFound(item.id.clone()));
    }
    if item.kind != ItemKind::Consumable {
        return Err(InventoryError::InvalidKind {
            item_id: item.id.clone(),
            kind: item.kind,
            expected: ItemKind::Consumable,
        });
    }

    character.apply_effect(&item.effect);
    remove_item(character, &item.id)?;
    info!("{} used {} ({})", character.name, item.id, item.effect);
    Ok(format!("Used {}: {}.", item.name, item.effect))
}

/// Equip a weapon, displacing any currently equipped one back into the
/// inventory (its bonus reversed first).
///
/// # Errors
/// [`InventoryError::NotFound`], [`InventoryError::InvalidKind`], or
/// [`InventoryError::Full`] when a displaced item has nowhere to go — checked
/// before anything is mutated.
pub fn equip_weapon(character: &mut Character, item: &Item) -> Result<String, InventoryError> {
    equip(character, item, EquipSlot::Weapon)
}

/// Equip armor; same displacement rules as [`equip_weapon`].
///
/// # Errors
/// As [`equip_weapon`].
pub fn equip_armor(character: &mut Character, item: &Item) -> Result<String, InventoryError> {
    equip(character, item, EquipSlot::Armor)
}

fn equip(
    character: &mut Character,
    item: &Item,
    slot: EquipSlot,
) -> Result<String, InventoryError> {
    if !has_item(character, &item.id) {
        return Err(InventoryError::NotFound(item.id.clone()));
    }
    if item.kind != slot.kind() {
        return Err(InventoryError::InvalidKind {
            item_id: item.id.clone(),
            kind: item.kind,
            expected: slot.kind(),
        });
    }

    // Displace the current occupant first. The space check happens before any
    // mutation, so a full inventory blocks re-equipping entirely.
    if let Some(current) = slot_ref(character, slot).clone() {
        if character.inventory.len() >= MAX_INVENTORY_SIZE {
            return Err(InventoryError::Full);
        }
        character.inventory.push(current.item_id.clone());
        character.apply_effect(&current.bonus.reversed());
    }

    character.apply_effect(&item.effect);
    *slot_mut(character, slot) = Some(EquippedItem {
        item_id: item.id.clone(),
        bonus: item.effect,
    });
    remove_item(character, &item.id)?;

    info!("{} equipped {} ({})", character.name, item.id, item.effect);
    Ok(format!("Equipped {}.", item.name))
}

/// Unequip the weapon slot, reversing its bonus and returning the item id,
/// or `None` if the slot was empty.
///
/// # Errors
/// [`InventoryError::Full`] if there is no room to take the item back.
pub fn unequip_weapon(character: &mut Character) -> Result<Option<Id>, InventoryError> {
    unequip(character, EquipSlot::Weapon)
}

/// Unequip the armor slot; same rules as [`unequip_weapon`].
///
/// # Errors
/// As [`unequip_weapon`].
pub fn unequip_armor(character: &mut Character) -> Result<Option<Id>, InventoryError> {
    unequip(character, EquipSlot::Armor)
}

fn unequip(character: &mut Character, slot: EquipSlot) -> Result<Option<Id>, InventoryError> {
    let Some(current) = slot_ref(character, slot).clone() else {
        return Ok(None);
    };
    if character.inventory.len() >= MAX_INVENTORY_SIZE {
        return Err(InventoryError::Full);
    }

    character.apply_effect(&current.bonus.reversed());
    character.inventory.push(current.item_id.clone());
    *slot_mut(character, slot) = None;

    info!("{} unequipped {}", character.name, current.item_id);
    Ok(Some(current.item_id))
}

fn slot_ref(character: &Character, slot: EquipSlot) -> &Option<EquippedItem> {
    match slot {
        EquipSlot::Weapon => &character.equipped_weapon,
        EquipSlot::Armor => &character.equipped_armor,
    }
}

fn slot_mut(character: &mut Character, slot: EquipSlot) -> &mut Option<EquippedItem> {
    match slot {
        EquipSlot::Weapon => &mut character.equipped_weapon,
        EquipSlot::Armor => &mut character.equipped_armor,
    }
}

/// Buy an item at catalog cost.
///
/// # Errors
/// [`InventoryError::InsufficientGold`] then [`InventoryError::Full`]; no
/// gold moves unless the item fits.
pub fn purchase_item(character: &mut Character, item: &Item) -> Result<(), InventoryError> {
    if character.gold < item.cost {
        return Err(InventoryError::InsufficientGold {
            cost: item.cost,
            gold: character.gold,
        });
    }
    if space_remaining(character) == 0 {
        return Err(InventoryError::Full);
    }
    character.gold -= item.cost;
    add_item(character, &item.id)?;
    info!("{} bought {} for {} gold", character.name, item.id, item.cost);
    Ok(())
}

/// Sell one carried unit of an item for half its catalog cost (floored).
/// Returns the gold received.
///
/// # Errors
/// [`InventoryError::NotFound`] if the item is not carried.
pub fn sell_item(character: &mut Character, item: &Item) -> Result<i64, InventoryError> {
    if !has_item(character, &item.id) {
        return Err(InventoryError::NotFound(item.id.clone()));
    }
    let price = item.cost / 2;
    remove_item(character, &item.id)?;
    character.gold += price;
    info!("{} sold {} for {price} gold", character.name, item.id);
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::ClassArchetype;
    use chronicle_data::{Effect, StatKind};

    fn hero() -> Character {
        Character::new("Hero", ClassArchetype::Warrior)
    }

    fn item(id: &str, kind: ItemKind, effect: Effect, cost: i64) -> Item {
        Item {
            id: id.into(),
            name: id.into(),
            kind,
            effect,
            cost,
            description: String::new(),
        }
    }

    fn sword() -> Item {
        item("sword_basic", ItemKind::Weapon, Effect::new(StatKind::Strength, 5), 100)
    }

    fn robe() -> Item {
        item("robe_apprentice", ItemKind::Armor, Effect::new(StatKind::Health, 10), 80)
    }

    fn potion() -> Item {
        item("potion_small", ItemKind::Consumable, Effect::new(StatKind::Health, 20), 30)
    }

    #[test]
    fn twenty_first_item_is_rejected_without_changes() {
        let mut c = hero();
        for n in 0..MAX_INVENTORY_SIZE {
            add_item(&mut c, &format!("trinket_{n}")).unwrap();
        }
        assert_eq!(space_remaining(&c), 0);
        assert_eq!(add_item(&mut c, "one_too_many"), Err(InventoryError::Full));
        assert_eq!(c.inventory.len(), MAX_INVENTORY_SIZE);
        assert!(!has_item(&c, "one_too_many"));
    }

    #[test]
    fn remove_takes_one_occurrence() {
        let mut c = hero();
        add_item(&mut c, "potion_small").unwrap();
        add_item(&mut c, "potion_small").unwrap();
        assert_eq!(count_item(&c, "potion_small"), 2);
        remove_item(&mut c, "potion_small").unwrap();
        assert_eq!(count_item(&c, "potion_small"), 1);
        assert!(matches!(
            remove_item(&mut c, "missing"),
            Err(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn consumables_apply_then_leave_the_bag() {
        let mut c = hero();
        c.health = 90;
        add_item(&mut c, "potion_small").unwrap();
        use_item(&mut c, &potion()).unwrap();
        assert_eq!(c.health, 110);
        assert!(!has_item(&c, "potion_small"));
    }

    #[test]
    fn health_consumables_never_overheal() {
        let mut c = hero();
        c.health = 115; // max 120
        add_item(&mut c, "potion_small").unwrap();
        use_item(&mut c, &potion()).unwrap();
        assert_eq!(c.health, 120);
    }

    #[test]
    fn only_consumables_can_be_used() {
        let mut c = hero();
        add_item(&mut c, "sword_basic").unwrap();
        assert_eq!(
            use_item(&mut c, &sword()),
            Err(InventoryError::InvalidKind {
                item_id: "sword_basic".to_string(),
                kind: ItemKind::Weapon,
                expected: ItemKind::Consumable,
            })
        );
        assert!(has_item(&c, "sword_basic"));
    }

    #[test]
    fn equip_then_unequip_restores_everything() {
        let mut c = hero();
        let base_strength = c.strength;
        add_item(&mut c, "sword_basic").unwrap();

        equip_weapon(&mut c, &sword()).unwrap();
        assert_eq!(c.strength, base_strength + 5);
        assert!(!has_item(&c, "sword_basic"));
        assert_eq!(c.equipped_weapon.as_ref().unwrap().item_id, "sword_basic");

        let returned = unequip_weapon(&mut c).unwrap();
        assert_eq!(returned.as_deref(), Some("sword_basic"));
        assert_eq!(c.strength, base_strength);
        assert!(has_item(&c, "sword_basic"));
        assert!(c.equipped_weapon.is_none());
    }

    #[test]
    fn unequipping_an_empty_slot_is_a_no_op() {
        let mut c = hero();
        assert_eq!(unequip_weapon(&mut c).unwrap(), None);
        assert_eq!(unequip_armor(&mut c).unwrap(), None);
    }

    #[test]
    fn equipping_swaps_out_the_old_weapon() {
        let mut c = hero();
        let base_strength = c.strength;
        let dagger = item("dagger", ItemKind::Weapon, Effect::new(StatKind::Strength, 2), 40);
        add_item(&mut c, "sword_basic").unwrap();
        add_item(&mut c, "dagger").unwrap();

        equip_weapon(&mut c, &sword()).unwrap();
        equip_weapon(&mut c, &dagger).unwrap();

        // only the dagger's bonus remains, and the sword came back
        assert_eq!(c.strength, base_strength + 2);
        assert!(has_item(&c, "sword_basic"));
        assert!(!has_item(&c, "dagger"));
        assert_eq!(c.equipped_weapon.as_ref().unwrap().item_id, "dagger");
    }

    #[test]
    fn full_inventory_blocks_reequipping_and_unequipping() {
        let mut c = hero();
        add_item(&mut c, "sword_basic").unwrap();
        equip_weapon(&mut c, &sword()).unwrap();
        for n in 0..MAX_INVENTORY_SIZE {
            add_item(&mut c, &format!("trinket_{n}")).unwrap();
        }

        let strength_before = c.strength;
        let dagger = item("dagger", ItemKind::Weapon, Effect::new(StatKind::Strength, 2), 40);
        // the dagger itself is not carried here, so NotFound fires first
        assert!(matches!(
            equip_weapon(&mut c, &dagger),
            Err(InventoryError::NotFound(_))
        ));

        assert_eq!(unequip_weapon(&mut c), Err(InventoryError::Full));
        assert_eq!(c.strength, strength_before);
        assert_eq!(c.equipped_weapon.as_ref().unwrap().item_id, "sword_basic");
    }

    #[test]
    fn displaced_item_space_is_checked_before_any_mutation() {
        let mut c = hero();
        add_item(&mut c, "sword_basic").unwrap();
        equip_weapon(&mut c, &sword()).unwrap();

        let dagger = item("dagger", ItemKind::Weapon, Effect::new(StatKind::Strength, 2), 40);
        add_item(&mut c, "dagger").unwrap();
        for n in 0..MAX_INVENTORY_SIZE - 1 {
            add_item(&mut c, &format!("trinket_{n}")).unwrap();
        }
        assert_eq!(c.inventory.len(), MAX_INVENTORY_SIZE);

        let strength_before = c.strength;
        assert_eq!(equip_weapon(&mut c, &dagger), Err(InventoryError::Full));
        assert_eq!(c.strength, strength_before);
        assert!(has_item(&c, "dagger"));
        assert_eq!(c.equipped_weapon.as_ref().unwrap().item_id, "sword_basic");
    }

    #[test]
    fn armor_slot_works_like_the_weapon_slot() {
        let mut c = hero();
        c.health = 100;
        add_item(&mut c, "robe_apprentice").unwrap();
        equip_armor(&mut c, &robe()).unwrap();
        assert_eq!(c.health, 110);
        assert_eq!(c.equipped_armor.as_ref().unwrap().item_id, "robe_apprentice");

        unequip_armor(&mut c).unwrap();
        assert_eq!(c.health, 100);
        assert!(has_item(&c, "robe_apprentice"));
    }

    #[test]
    fn buying_then_selling_nets_half_the_cost() {
        let mut c = hero();
        purchase_item(&mut c, &sword()).unwrap();
        assert_eq!(c.gold, 0);
        assert!(has_item(&c, "sword_basic"));

        let received = sell_item(&mut c, &sword()).unwrap();
        assert_eq!(received, 50);
        assert_eq!(c.gold, 50);
        assert!(!has_item(&c, "sword_basic"));
    }

    #[test]
    fn shop_rejects_poor_or_overloaded_buyers() {
        let mut c = hero();
        c.gold = 10;
        assert_eq!(
            purchase_item(&mut c, &sword()),
            Err(InventoryError::InsufficientGold { cost: 100, gold: 10 })
        );
        assert!(c.inventory.is_empty());

        c.gold = 500;
        for n in 0..MAX_INVENTORY_SIZE {
            add_item(&mut c, &format!("trinket_{n}")).unwrap();
        }
        assert_eq!(purchase_item(&mut c, &sword()), Err(InventoryError::Full));
        assert_eq!(c.gold, 500);
    }

    #[test]
    fn selling_something_you_lack_fails() {
        let mut c = hero();
        assert!(matches!(
            sell_item(&mut c, &potion()),
            Err(InventoryError::NotFound(_))
        ));
        assert_eq!(c.gold, 100);
    }

    #[test]
    fn clearing_returns_the_former_contents() {
        let mut c = hero();
        add_item(&mut c, "a").unwrap();
        add_item(&mut c, "b").unwrap();
        let removed = clear_inventory(&mut c);
        assert_eq!(removed, vec!["a".to_string(), "b".to_string()]);
        assert!(c.inventory.is_empty());
    }
}
