use std::fmt::Write;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::adapters::catalog::MonsterCatalog;
use crate::adapters::json_store::JsonStore;
use crate::app::encounter_service::EncounterService;
use crate::app::loot_service::ItemCollection;
use crate::app::render::{render_breakdown, render_encounter, render_item, render_roll};
use crate::config::cli::{Command, EncounterCommand, EncounterEdit, LootCommand, SavedCommand};
use crate::config::toml_config::AppConfig;
use crate::core::combat::{parse_quick_add, resolve_condition, roll_all_initiative};
use crate::core::dice::DiceExpr;
use crate::core::generator::GeminiGenerator;
use crate::domain::encounter::{Creature, Encounter};
use crate::domain::loot::{LootParameters, MagicItem, QuickLootParameters};
use crate::domain::ports::{ItemGenerator, Storage};
use crate::utils::error::{DmError, Result};
use crate::utils::validation::validate_non_empty_string;

const MAX_DICE_REPEAT: u32 = 100;

/// Runs CLI commands against one data directory. Every command returns the
/// text to print.
pub struct App<S: Storage + Clone> {
    config: AppConfig,
    storage: S,
    generator: Option<Arc<dyn ItemGenerator>>,
}

/// 1-based position from the CLI to a list index.
fn to_index(position: usize) -> Result<usize> {
    position.checked_sub(1).ok_or_else(|| DmError::ValidationError {
        message: "positions start at 1".to_string(),
    })
}

impl<S: Storage + Clone> App<S> {
    pub fn new(config: AppConfig, storage: S) -> Self {
        Self {
            config,
            storage,
            generator: None,
        }
    }

    /// Uses `generator` instead of building a Gemini client per request.
    pub fn with_generator(mut self, generator: Arc<dyn ItemGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    fn store(&self) -> JsonStore<S> {
        JsonStore::new(self.storage.clone())
    }

    fn encounters(&self) -> EncounterService<S> {
        EncounterService::new(self.store())
    }

    fn items(&self) -> ItemCollection<S> {
        ItemCollection::new(self.store())
    }

    fn generator(&self, api_key: Option<&str>) -> Result<Arc<dyn ItemGenerator>> {
        match &self.generator {
            Some(generator) => Ok(Arc::clone(generator)),
            None => Ok(Arc::new(GeminiGenerator::new(&self.config.gemini, api_key)?)),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<String> {
        match command {
            Command::Encounter { action } => self.encounter(action).await,
            Command::Loot { action } => self.loot(action).await,
            Command::Dice { expr, times } => self.dice(&expr, times),
            Command::Monsters { search } => self.monsters(search.as_deref()).await,
        }
    }

    async fn encounter(&self, action: EncounterCommand) -> Result<String> {
        let service = self.encounters();

        match action {
            EncounterCommand::Show => Ok(render_encounter(&service.current().await)),
            EncounterCommand::List => {
                let names = service.saved_names().await;
                if names.is_empty() {
                    return Ok("No saved encounters yet.".to_string());
                }
                Ok(names
                    .iter()
                    .map(|n| format!("- {}", n))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            EncounterCommand::Save => {
                let encounter = service.current().await;
                service.save(&encounter).await?;
                Ok(format!("💾 Saved encounter: {}", encounter.name))
            }
            EncounterCommand::Load { name } => {
                let encounter = service.load(&name).await?;
                Ok(format!(
                    "📂 Loaded encounter: {}\n\n{}",
                    name,
                    render_encounter(&encounter)
                ))
            }
            EncounterCommand::Edit(edit) => {
                // 失敗時不寫回，目前遭遇維持原狀
                let mut encounter = service.current().await;
                let message = self.apply_encounter_action(&mut encounter, edit).await?;
                service.store_current(&encounter).await?;
                Ok(format!("{}\n\n{}", message, render_encounter(&encounter)))
            }
        }
    }

    async fn apply_encounter_action(
        &self,
        encounter: &mut Encounter,
        action: EncounterEdit,
    ) -> Result<String> {
        let message = match action {
            EncounterEdit::New { name } => {
                validate_non_empty_string("name", &name)?;
                *encounter = Encounter::named(name.trim());
                format!("🆕 Started encounter: {}", encounter.name)
            }
            EncounterEdit::Rename { name } => {
                validate_non_empty_string("name", &name)?;
                encounter.name = name.trim().to_string();
                format!("✏️ Renamed encounter to {}", encounter.name)
            }
            EncounterEdit::Add {
                monster,
                name,
                hp,
                ac,
                init_mod,
                player,
            } => {
                let creature = self
                    .build_creature(monster.as_deref(), name, hp, ac, init_mod, player)
                    .await?;
                let added = format!("Added {} to encounter!", creature.name);
                encounter.add_creature(creature);
                added
            }
            EncounterEdit::QuickAdd { lines, file } => {
                let text = match file {
                    Some(path) => tokio::fs::read_to_string(path).await?,
                    None if lines.is_empty() => {
                        let mut buf = String::new();
                        tokio::io::stdin().read_to_string(&mut buf).await?;
                        buf
                    }
                    None => lines.join("\n"),
                };
                let result = parse_quick_add(&text);
                let added = result.creatures.len();
                encounter.creatures.extend(result.creatures);

                let mut message = format!("Added {} creatures!", added);
                for line in &result.unparsed {
                    let _ = write!(message, "\n⚠️ Could not parse: {}", line);
                }
                message
            }
            EncounterEdit::Remove { position } => {
                let index = to_index(position)?;
                match encounter.remove_creature(index) {
                    Some(removed) => format!("🗑️ Removed {}", removed.name),
                    None => format!("No creature at #{}", position),
                }
            }
            EncounterEdit::Roll => {
                roll_all_initiative(encounter, &mut rand::rng());
                "🎲 Rolled initiative for all creatures".to_string()
            }
            EncounterEdit::Next => {
                encounter.next_turn();
                turn_message(encounter)
            }
            EncounterEdit::Prev => {
                encounter.prev_turn();
                turn_message(encounter)
            }
            EncounterEdit::Reset => {
                encounter.reset_combat();
                "🔄 Combat reset to round 1".to_string()
            }
            EncounterEdit::Damage { position, amount } => {
                let creature = encounter.creature_mut(to_index(position)?)?;
                creature.apply_damage(amount);
                format!("💥 {} takes {} damage", creature.name, amount)
            }
            EncounterEdit::Heal { position, amount } => {
                let creature = encounter.creature_mut(to_index(position)?)?;
                creature.apply_healing(amount);
                format!("💚 {} heals {}", creature.name, amount)
            }
            EncounterEdit::FullHeal { position } => {
                let creature = encounter.creature_mut(to_index(position)?)?;
                creature.full_heal();
                format!("💚 {} is back to full HP", creature.name)
            }
            EncounterEdit::Condition {
                position,
                add,
                remove,
            } => {
                let to_add = add
                    .iter()
                    .map(|c| resolve_condition(c))
                    .collect::<Result<Vec<_>>>()?;
                let to_remove = remove
                    .iter()
                    .map(|c| resolve_condition(c))
                    .collect::<Result<Vec<_>>>()?;

                let creature = encounter.creature_mut(to_index(position)?)?;
                for condition in to_add {
                    creature.add_condition(condition);
                }
                for condition in to_remove {
                    creature.remove_condition(condition);
                }
                if creature.conditions.is_empty() {
                    format!("{} has no conditions", creature.name)
                } else {
                    format!("{}: {}", creature.name, creature.conditions.join(", "))
                }
            }
            EncounterEdit::Note { position, text } => {
                let creature = encounter.creature_mut(to_index(position)?)?;
                creature.notes = text.filter(|t| !t.trim().is_empty());
                format!("📝 Updated notes for {}", creature.name)
            }
        };

        Ok(message)
    }

    /// SRD template values act as defaults, explicit flags win.
    async fn build_creature(
        &self,
        monster: Option<&str>,
        name: Option<String>,
        hp: Option<u32>,
        ac: Option<u32>,
        init_mod: Option<i32>,
        player: bool,
    ) -> Result<Creature> {
        let template = match monster {
            Some(monster) => {
                let catalog = MonsterCatalog::load(&self.store()).await?;
                Some(catalog.find(monster)?.to_creature()?)
            }
            None => None,
        };
        let (default_name, default_hp, default_ac, default_init) = match template {
            Some(t) => (t.name, t.max_hp, t.armor_class, t.initiative_modifier),
            None => (String::new(), 10, 10, 0),
        };

        Creature::new(
            name.unwrap_or(default_name),
            hp.unwrap_or(default_hp),
            ac.unwrap_or(default_ac),
            init_mod.unwrap_or(default_init),
            player,
        )
    }

    async fn loot(&self, action: LootCommand) -> Result<String> {
        match action {
            LootCommand::Quick {
                rarity,
                theme,
                api_key,
                save,
            } => {
                let params = QuickLootParameters {
                    rarity,
                    theme_description: theme.unwrap_or_default(),
                };
                let generator = self.generator(api_key.as_deref())?;
                tracing::info!("🪄 AI is creating your {} item...", params.rarity);
                let item = generator.generate_quick_item(&params).await?;
                self.finish_item(item, save).await
            }
            LootCommand::Generate {
                params,
                api_key,
                save,
            } => {
                let params = LootParameters::from_file(&params)?;
                let generator = self.generator(api_key.as_deref())?;
                tracing::info!("🪄 Generating {} {}...", params.rarity, params.item_subtype);
                let item = generator.generate_item(&params).await?;
                let analysis = render_breakdown(&params);
                let rendered = self.finish_item(item, save).await?;
                Ok(format!("{}\n{}", rendered, analysis))
            }
            LootCommand::Score { params } => {
                let params = LootParameters::from_file(&params)?;
                Ok(render_breakdown(&params))
            }
            LootCommand::Saved { action } => self.saved_items(action).await,
            LootCommand::Subtypes { item_type } => Ok(item_type
                .subtypes()
                .iter()
                .map(|s| format!("- {}", s))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    async fn finish_item(&self, item: MagicItem, save: bool) -> Result<String> {
        let mut out = render_item(&item);
        if save {
            self.items().save(&item).await?;
            let _ = write!(out, "\n💾 Saved '{}' to collection!", item.name);
        }
        Ok(out)
    }

    async fn saved_items(&self, action: SavedCommand) -> Result<String> {
        let collection = self.items();
        match action {
            SavedCommand::List => {
                let items = collection.list().await;
                if items.is_empty() {
                    return Ok("No saved items yet. Generate and save some items!".to_string());
                }
                Ok(items
                    .iter()
                    .enumerate()
                    .map(|(i, saved)| {
                        format!(
                            "#{} {} - {} {}",
                            i + 1,
                            saved.item.name,
                            saved.item.rarity,
                            saved.item.subtype
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            SavedCommand::Delete { position } => {
                let removed = collection.delete(to_index(position)?).await?;
                Ok(format!("🗑️ Deleted '{}'", removed.item.name))
            }
        }
    }

    fn dice(&self, expr: &str, times: u32) -> Result<String> {
        let parsed: DiceExpr = expr.parse()?;
        crate::utils::validation::validate_range("times", times, 1, MAX_DICE_REPEAT)?;

        let mut rng = rand::rng();
        let mut lines: Vec<String> = (0..times)
            .map(|_| render_roll(&parsed, &parsed.roll(&mut rng)))
            .collect();
        lines.push(format!(
            "range {}..={}, average {:.1}",
            parsed.min(),
            parsed.max(),
            parsed.average()
        ));
        Ok(lines.join("\n"))
    }

    async fn monsters(&self, search: Option<&str>) -> Result<String> {
        let catalog = MonsterCatalog::load(&self.store()).await?;
        let monsters = match search {
            Some(text) => catalog.search(text),
            None => catalog.all().iter().collect(),
        };
        if monsters.is_empty() {
            return Ok("No matching monsters.".to_string());
        }
        Ok(monsters
            .iter()
            .map(|m| {
                format!(
                    "{:<20} HP {:>3} | AC {:>2} | Init {:+}",
                    m.name, m.hp, m.ac, m.initiative_modifier
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn turn_message(encounter: &Encounter) -> String {
    match encounter.current_creature() {
        Some(c) => format!("➡️ Round {}: {}'s turn", encounter.round_number, c.name),
        None => "No creatures in encounter".to_string(),
    }
}

impl App<crate::adapters::storage::LocalStorage> {
    /// App rooted at the configured data directory.
    pub fn from_config(config: AppConfig) -> Self {
        let storage = crate::adapters::storage::LocalStorage::new(config.storage.data_dir.clone());
        Self::new(config, storage)
    }
}
