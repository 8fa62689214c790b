//! The interactive menu loop: character creation, the main game menu, and
//! the submenus for inventory, quests, battles, and the shop.
//!
//! All game rules live in the other modules; this one only translates menu
//! choices into calls and renders the results. Progress autosaves after
//! every game-menu action.

pub mod input;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chronicle_data::{Id, Item, Quest};
use log::warn;
use rand::Rng;

use crate::character::{Character, ClassArchetype};
use crate::combat::{self, Battle, EnemyKind, Winner};
use crate::inventory;
use crate::loader::Catalogs;
use crate::quests;
use crate::save_files::{self, SAVE_DIR};
use crate::style::GameStyle;

use input::{InputEvent, InputManager};

const REVIVE_COST: i64 = 20;

/// Whether the player wants to keep going after a menu action.
enum ReplControl {
    Continue,
    Quit,
}

/// One playthrough: the character being played plus the loaded catalogs.
struct GameSession {
    character: Character,
    catalogs: Catalogs,
    save_dir: PathBuf,
}

/// Run the game from the title menu until the player exits.
///
/// # Errors
/// Propagates IO failures from input handling and save files. Rule
/// violations (bad menu choices, failed purchases, locked quests) are
/// reported to the player and never abort the loop.
pub fn run_repl(catalogs: Catalogs) -> Result<()> {
    let mut input = InputManager::new();
    let mut rng = rand::rng();
    let save_dir = PathBuf::from(SAVE_DIR);

    loop {
        println!("\n{}", "=== EMBERFALL CHRONICLES ===".heading_style());
        println!("  1) New Game");
        println!("  2) Load Game");
        println!("  3) Exit");

        let Some(choice) = read_choice(&mut input)? else {
            break;
        };
        let character = match choice.as_str() {
            "1" => new_game(&mut input)?,
            "2" => load_game(&mut input, &save_dir)?,
            "3" => break,
            other => {
                println!("{}", format!("'{other}' is not a menu option.").error_style());
                continue;
            }
        };

        if let Some(character) = character {
            let mut session = GameSession {
                character,
                catalogs: catalogs.clone(),
                save_dir: save_dir.clone(),
            };
            session.game_loop(&mut input, &mut rng)?;
        }
    }

    println!("{}", "Farewell, adventurer.".prompt_style());
    Ok(())
}

/// Prompt for a name and class, then build a fresh character.
fn new_game(input: &mut InputManager) -> Result<Option<Character>> {
    let Some(name) = read_line(input, "Character name [Hero]: ")? else {
        return Ok(None);
    };
    let name = if name.trim().is_empty() { "Hero".to_string() } else { name.trim().to_string() };

    println!("\n{}", "Choose a class:".subheading_style());
    for (n, class) in ClassArchetype::ALL.iter().enumerate() {
        let (health, strength, magic) = class.base_stats();
        println!(
            "  {}) {class} (health {health}, strength {strength}, magic {magic}) - {}",
            n + 1,
            class.ability_name()
        );
    }
    let Some(choice) = read_choice(input)? else {
        return Ok(None);
    };
    let class = match choice.as_str() {
        "2" => ClassArchetype::Mage,
        "3" => ClassArchetype::Rogue,
        "4" => ClassArchetype::Cleric,
        _ => ClassArchetype::Warrior,
    };

    let character = Character::new(name, class);
    println!(
        "\n{}",
        format!("{} the {} sets out with {} gold.", character.name, character.class, character.gold)
            .success_style()
    );
    Ok(Some(character))
}

/// List existing saves and load the chosen one.
fn load_game(input: &mut InputManager, save_dir: &Path) -> Result<Option<Character>> {
    let names = save_files::list_saved_characters(save_dir).context("listing save files")?;
    if names.is_empty() {
        println!("{}", "No saved characters found.".error_style());
        return Ok(None);
    }

    println!("\n{}", "Saved characters:".subheading_style());
    for (n, name) in names.iter().enumerate() {
        println!("  {}) {name}", n + 1);
    }
    let Some(choice) = read_choice(input)? else {
        return Ok(None);
    };
    let Some(name) = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| names.get(idx))
    else {
        println!("{}", "That is not one of the saves.".error_style());
        return Ok(None);
    };

    match save_files::load_character(save_dir, name) {
        Ok(character) => {
            println!(
                "{}",
                format!("Welcome back, {} the {}.", character.name, character.class).success_style()
            );
            Ok(Some(character))
        }
        Err(err) => {
            warn!("failed to load save '{name}': {err}");
            println!("{}", format!("Could not load that save: {err}").error_style());
            Ok(None)
        }
    }
}

impl GameSession {
    /// The in-game menu. Every action autosaves on the way out.
    fn game_loop(&mut self, input: &mut InputManager, rng: &mut impl Rng) -> Result<()> {
        loop {
            // a freshly loaded (or just-defeated) dead character goes
            // straight to the healer
            if self.character.is_dead() {
                if matches!(self.handle_death(input)?, ReplControl::Quit) {
                    self.autosave();
                    return Ok(());
                }
                self.autosave();
            }
            println!(
                "\n{} {}",
                self.character.name.heading_style(),
                format!(
                    "(level {} {}, {}/{} hp, {} gold)",
                    self.character.level,
                    self.character.class,
                    self.character.health,
                    self.character.max_health,
                    self.character.gold
                )
            );
            println!("  1) View Stats");
            println!("  2) Inventory");
            println!("  3) Quests");
            println!("  4) Explore");
            println!("  5) Shop");
            println!("  6) Save & Quit");

            let Some(choice) = read_choice(input)? else {
                self.autosave();
                return Ok(());
            };
            let control = match choice.as_str() {
                "1" => {
                    self.view_stats();
                    ReplControl::Continue
                }
                "2" => self.inventory_menu(input)?,
                "3" => self.quest_menu(input)?,
                "4" => self.explore(input, rng)?,
                "5" => self.shop_menu(input)?,
                "6" => ReplControl::Quit,
                other => {
                    println!("{}", format!("'{other}' is not a menu option.").error_style());
                    continue;
                }
            };

            self.autosave();
            if matches!(control, ReplControl::Quit) {
                println!("{}", "Progress saved.".success_style());
                return Ok(());
            }
        }
    }

    fn autosave(&self) {
        if let Err(err) = save_files::save_character(&self.save_dir, &self.character) {
            warn!("autosave failed: {err}");
            println!("{}", format!("Warning: could not save progress ({err})").error_style());
        }
    }

    fn view_stats(&self) {
        let c = &self.character;
        println!("\n{}", format!("{} the {}", c.name, c.class).heading_style());
        println!("  Level:      {}", c.level);
        println!("  Health:     {}/{}", c.health, c.max_health);
        println!("  Strength:   {}", c.strength);
        println!("  Magic:      {}", c.magic);
        println!(
            "  Experience: {} (next level at {})",
            c.experience,
            i64::from(c.level) * 100
        );
        println!("  Gold:       {}", c.gold.to_string().gold_style());

        let weapon = slot_label(&c.equipped_weapon, &self.catalogs.items);
        let armor = slot_label(&c.equipped_armor, &self.catalogs.items);
        println!("  Weapon:     {weapon}");
        println!("  Armor:      {armor}");

        let percent = quests::completion_percentage(c, &self.catalogs.quests);
        let totals = quests::total_rewards_earned(c, &self.catalogs.quests);
        println!(
            "  Quests:     {} active, {} completed ({percent:.0}% of all quests)",
            c.active_quests.len(),
            c.completed_quests.len()
        );
        println!("  Quest earnings: {} xp, {} gold", totals.xp, totals.gold);
    }

    fn inventory_menu(&mut self, input: &mut InputManager) -> Result<ReplControl> {
        loop {
            println!(
                "\n{} ({}/{} slots)",
                "Inventory".subheading_style(),
                self.character.inventory.len(),
                inventory::MAX_INVENTORY_SIZE
            );
            if self.character.inventory.is_empty() {
                println!("  (empty)");
            } else {
                for (n, id) in self.character.inventory.iter().enumerate() {
                    println!("  {}) {}", n + 1, item_label(id, &self.catalogs.items));
                }
            }
            println!("  u) Use item   w) Equip weapon   a) Equip armor");
            println!("  uw) Unequip weapon   ua) Unequip armor   d) Drop item   b) Back");

            let Some(choice) = read_choice(input)? else {
                return Ok(ReplControl::Quit);
            };
            match choice.as_str() {
                "u" => {
                    if let Some(item) = self.pick_carried_item(input)? {
                        report(inventory::use_item(&mut self.character, &item));
                    }
                }
                "w" => {
                    if let Some(item) = self.pick_carried_item(input)? {
                        report(inventory::equip_weapon(&mut self.character, &item));
                    }
                }
                "a" => {
                    if let Some(item) = self.pick_carried_item(input)? {
                        report(inventory::equip_armor(&mut self.character, &item));
                    }
                }
                "uw" => match inventory::unequip_weapon(&mut self.character) {
                    Ok(Some(id)) => println!(
                        "{}",
                        format!("Unequipped {}.", item_label(&id, &self.catalogs.items)).success_style()
                    ),
                    Ok(None) => println!("No weapon equipped."),
                    Err(err) => println!("{}", err.to_string().error_style()),
                },
                "ua" => match inventory::unequip_armor(&mut self.character) {
                    Ok(Some(id)) => println!(
                        "{}",
                        format!("Unequipped {}.", item_label(&id, &self.catalogs.items)).success_style()
                    ),
                    Ok(None) => println!("No armor equipped."),
                    Err(err) => println!("{}", err.to_string().error_style()),
                },
                "d" => {
                    if let Some(id) = self.pick_carried_id(input)? {
                        report(inventory::remove_item(&mut self.character, &id).map(|()| format!("Dropped {id}.")));
                    }
                }
                "b" => return Ok(ReplControl::Continue),
                other => println!("{}", format!("'{other}' is not a menu option.").error_style()),
            }
        }
    }

    /// Pick a carried item by inventory number and resolve it in the catalog.
    fn pick_carried_item(&mut self, input: &mut InputManager) -> Result<Option<Item>> {
        let Some(id) = self.pick_carried_id(input)? else {
            return Ok(None);
        };
        match self.catalogs.items.get(&id) {
            Some(item) => Ok(Some(item.clone())),
            None => {
                println!("{}", format!("'{id}' is not in the item catalog.").error_style());
                Ok(None)
            }
        }
    }

    fn pick_carried_id(&mut self, input: &mut InputManager) -> Result<Option<Id>> {
        if self.character.inventory.is_empty() {
            println!("Your pack is empty.");
            return Ok(None);
        }
        let Some(choice) = read_line(input, "Which item number? ")? else {
            return Ok(None);
        };
        let picked = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.character.inventory.get(idx))
            .cloned();
        if picked.is_none() {
            println!("{}", "That is not one of your items.".error_style());
        }
        Ok(picked)
    }

    fn quest_menu(&mut self, input: &mut InputManager) -> Result<ReplControl> {
        loop {
            println!("\n{}", "Quest Log".subheading_style());
            let active = quests::active_quests(&self.character, &self.catalogs.quests);
            if active.is_empty() {
                println!("  No active quests.");
            } else {
                for quest in active {
                    print_quest(quest, "active");
                }
            }
            for quest in quests::completed_quests(&self.character, &self.catalogs.quests) {
                print_quest(quest, "done");
            }

            println!("  v) View available   a) Accept   c) Complete   x) Abandon   p) Prerequisites   b) Back");
            let Some(choice) = read_choice(input)? else {
                return Ok(ReplControl::Quit);
            };
            match choice.as_str() {
                "v" => {
                    let available = quests::available_quests(&self.character, &self.catalogs.quests);
                    if available.is_empty() {
                        println!("Nothing new is available right now.");
                    }
                    for quest in available {
                        print_quest(quest, "available");
                    }
                }
                "a" => {
                    if let Some(id) = read_line(input, "Accept which quest id? ")? {
                        report(
                            quests::accept_quest(&mut self.character, id.trim(), &self.catalogs.quests)
                                .map(|()| format!("Accepted '{}'.", id.trim())),
                        );
                    }
                }
                "c" => {
                    if let Some(id) = read_line(input, "Complete which quest id? ")? {
                        report(
                            quests::complete_quest(&mut self.character, id.trim(), &self.catalogs.quests)
                                .map(|reward| {
                                    format!("Completed '{}': +{} xp, +{} gold!", reward.quest_id, reward.xp, reward.gold)
                                }),
                        );
                    }
                }
                "x" => {
                    if let Some(id) = read_line(input, "Abandon which quest id? ")? {
                        report(
                            quests::abandon_quest(&mut self.character, id.trim())
                                .map(|()| format!("Abandoned '{}'.", id.trim())),
                        );
                    }
                }
                "p" => {
                    if let Some(id) = read_line(input, "Show chain for which quest id? ")? {
                        match quests::prerequisite_chain(id.trim(), &self.catalogs.quests) {
                            Ok(chain) => println!("  {}", chain.join(" -> ").quest_style()),
                            Err(err) => println!("{}", err.to_string().error_style()),
                        }
                    }
                }
                "b" => return Ok(ReplControl::Continue),
                other => println!("{}", format!("'{other}' is not a menu option.").error_style()),
            }
        }
    }

    fn shop_menu(&mut self, input: &mut InputManager) -> Result<ReplControl> {
        loop {
            println!(
                "\n{} (you have {} gold)",
                "General Store".subheading_style(),
                self.character.gold.to_string().gold_style()
            );
            let mut stock: Vec<&Item> = self.catalogs.items.values().collect();
            stock.sort_by(|a, b| a.cost.cmp(&b.cost).then(a.id.cmp(&b.id)));
            for (n, item) in stock.iter().enumerate() {
                println!(
                    "  {}) {} - {} gold ({}, {})",
                    n + 1,
                    item.name.item_style(),
                    item.cost,
                    item.kind,
                    item.effect
                );
                println!("     {}", textwrap::fill(&item.description, 70));
            }
            println!("  #) Buy by number   s) Sell an item   b) Back");

            let Some(choice) = read_choice(input)? else {
                return Ok(ReplControl::Quit);
            };
            match choice.as_str() {
                "s" => {
                    if let Some(item) = self.pick_carried_item(input)? {
                        report(
                            inventory::sell_item(&mut self.character, &item)
                                .map(|gold| format!("Sold {} for {gold} gold.", item.name)),
                        );
                    }
                }
                "b" => return Ok(ReplControl::Continue),
                number => {
                    let picked = number
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|idx| stock.get(idx))
                        .map(|item| (*item).clone());
                    match picked {
                        Some(item) => report(
                            inventory::purchase_item(&mut self.character, &item)
                                .map(|()| format!("Bought {} for {} gold.", item.name, item.cost)),
                        ),
                        None => println!("{}", format!("'{number}' is not a menu option.").error_style()),
                    }
                }
            }
        }
    }

    /// Head into the wilds and fight whatever the character's level attracts.
    fn explore(&mut self, input: &mut InputManager, rng: &mut impl Rng) -> Result<ReplControl> {
        if !combat::can_fight(&self.character) {
            println!("{}", "You are in no shape to fight.".error_style());
            return Ok(ReplControl::Continue);
        }

        let enemy = EnemyKind::for_level(self.character.level).spawn();
        println!(
            "\n{}",
            format!("A wild {} appears!", enemy.name.enemy_style()).battle_style()
        );

        let ability = self.character.class.ability_name();
        let mut battle = Battle::new(&mut self.character, enemy);
        let winner = loop {
            println!(
                "\n  You: {}/{} hp   {}: {}/{} hp   (round {})",
                battle.character().health,
                battle.character().max_health,
                battle.enemy().name.enemy_style(),
                battle.enemy().health,
                battle.enemy().max_health,
                battle.round()
            );
            println!("  1) Attack   2) {ability}   3) Run");

            let Some(choice) = read_choice(input)? else {
                // treat closed input as fleeing without a roll
                break None;
            };
            match choice.as_str() {
                "1" => {
                    println!("  {}", battle.player_turn()?.battle_style());
                    if let Some(winner) = battle.check_battle_end() {
                        break Some(winner);
                    }
                }
                "2" => match battle.use_special_ability(rng) {
                    Ok(line) => {
                        println!("  {}", line.battle_style());
                        if let Some(winner) = battle.check_battle_end() {
                            break Some(winner);
                        }
                    }
                    Err(err) => {
                        // a wasted press, not a wasted turn
                        println!("  {}", err.to_string().error_style());
                        continue;
                    }
                },
                "3" => {
                    if battle.attempt_escape(rng)? {
                        println!("  {}", "You slip away from the fight.".success_style());
                        break None;
                    }
                    println!("  {}", "You fail to get away!".error_style());
                }
                other => {
                    println!("{}", format!("'{other}' is not a menu option.").error_style());
                    continue;
                }
            }

            println!("  {}", battle.enemy_turn()?.battle_style());
            if let Some(winner) = battle.check_battle_end() {
                break Some(winner);
            }
        };

        let Some(winner) = winner else {
            // escaped or walked away; make sure the battle flag is down
            drop(battle);
            self.character.in_battle = false;
            return Ok(ReplControl::Continue);
        };
        let summary = battle.finish(winner).context("settling the battle")?;
        match summary.winner {
            Winner::Player => {
                println!(
                    "\n{}",
                    format!(
                        "Victory in {} rounds! +{} xp, +{} gold.",
                        summary.rounds, summary.xp_gained, summary.gold_gained
                    )
                    .success_style()
                );
                Ok(ReplControl::Continue)
            }
            Winner::Enemy => self.handle_death(input),
        }
    }

    /// The character has fallen: offer a paid revival or end the session.
    fn handle_death(&mut self, input: &mut InputManager) -> Result<ReplControl> {
        println!("\n{}", "You have been defeated...".battle_style());
        if self.character.gold < REVIVE_COST {
            println!(
                "{}",
                format!("A healer wants {REVIVE_COST} gold, but you cannot pay.").error_style()
            );
            return Ok(ReplControl::Quit);
        }

        println!("  1) Pay the healer {REVIVE_COST} gold to be revived");
        println!("  2) Accept your fate and quit");
        let Some(choice) = read_choice(input)? else {
            return Ok(ReplControl::Quit);
        };
        if choice == "1" {
            self.character.add_gold(-REVIVE_COST).context("paying the healer")?;
            self.character.revive();
            println!(
                "{}",
                format!("You awaken with {} health.", self.character.health).success_style()
            );
            Ok(ReplControl::Continue)
        } else {
            Ok(ReplControl::Quit)
        }
    }
}

fn print_quest(quest: &Quest, tag: &str) {
    println!(
        "  [{tag}] {} - {} (level {}, +{} xp, +{} gold)",
        quest.id.quest_style(),
        quest.title,
        quest.required_level,
        quest.reward_xp,
        quest.reward_gold
    );
    println!("     {}", textwrap::fill(&quest.description, 70));
}

fn item_label(id: &str, items: &HashMap<Id, Item>) -> String {
    match items.get(id) {
        Some(item) => format!("{} ({}, {})", item.name, item.kind, item.effect),
        None => id.to_string(),
    }
}

fn slot_label(slot: &Option<crate::character::EquippedItem>, items: &HashMap<Id, Item>) -> String {
    match slot {
        Some(equipped) => item_label(&equipped.item_id, items),
        None => "(none)".to_string(),
    }
}

/// Print either a success line or a styled error.
fn report<T: std::fmt::Display, E: std::fmt::Display>(result: Result<T, E>) {
    match result {
        Ok(message) => println!("{}", message.to_string().success_style()),
        Err(err) => println!("{}", err.to_string().error_style()),
    }
}

/// Read a trimmed menu choice; `None` means the player closed the input.
fn read_choice(input: &mut InputManager) -> Result<Option<String>> {
    read_line(input, "> ").map(|line| line.map(|l| l.trim().to_lowercase()))
}

fn read_line(input: &mut InputManager, prompt: &str) -> Result<Option<String>> {
    match input.read_line(&prompt.prompt_style().to_string()).context("reading input")? {
        InputEvent::Line(line) => Ok(Some(line)),
        InputEvent::Eof | InputEvent::Interrupted => Ok(None),
    }
}
