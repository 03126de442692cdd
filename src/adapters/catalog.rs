use serde::{Deserialize, Serialize};

use crate::adapters::json_store::JsonStore;
use crate::domain::encounter::Creature;
use crate::domain::ports::Storage;
use crate::utils::error::{DmError, Result};

pub const SRD_MONSTERS_FILE: &str = "srd_monsters.json";

const BUILTIN_MONSTERS: &str = include_str!("../../data/srd_monsters.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub hp: u32,
    pub ac: u32,
    #[serde(default)]
    pub initiative_modifier: i32,
}

impl MonsterTemplate {
    pub fn to_creature(&self) -> Result<Creature> {
        Creature::new(
            self.name.clone(),
            self.hp,
            self.ac,
            self.initiative_modifier,
            false,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonsterCatalog {
    monsters: Vec<MonsterTemplate>,
}

impl MonsterCatalog {
    pub fn new(monsters: Vec<MonsterTemplate>) -> Self {
        Self { monsters }
    }

    pub fn builtin() -> Result<Self> {
        Ok(Self::new(serde_json::from_str(BUILTIN_MONSTERS)?))
    }

    /// `srd_monsters.json` from the data directory, or the bundled list when
    /// the campaign has none.
    pub async fn load<S: Storage>(store: &JsonStore<S>) -> Result<Self> {
        match store.load::<Vec<MonsterTemplate>>(SRD_MONSTERS_FILE).await {
            Ok(Some(monsters)) => {
                tracing::debug!("Loaded {} monsters from {}", monsters.len(), SRD_MONSTERS_FILE);
                Ok(Self::new(monsters))
            }
            Ok(None) => Self::builtin(),
            Err(e) => {
                tracing::warn!("⚠️ {} is unreadable, using built-in monsters: {}", SRD_MONSTERS_FILE, e);
                Self::builtin()
            }
        }
    }

    pub fn all(&self) -> &[MonsterTemplate] {
        &self.monsters
    }

    pub fn find(&self, name: &str) -> Result<&MonsterTemplate> {
        let name = name.trim();
        self.monsters
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DmError::NotFound {
                what: format!("Monster '{}'", name),
            })
    }

    pub fn search<'a>(&'a self, text: &str) -> Vec<&'a MonsterTemplate> {
        let needle = text.trim().to_lowercase();
        self.monsters
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .collect()
    }
}
