use crate::adapters::json_store::JsonStore;
use crate::domain::encounter::Encounter;
use crate::domain::ports::Storage;
use crate::utils::error::{DmError, Result};

pub const CURRENT_ENCOUNTER_FILE: &str = "current_encounter.json";
pub const SAVED_ENCOUNTERS_FILE: &str = "saved_encounters.json";

/// Working encounter plus the library of saved encounters.
pub struct EncounterService<S: Storage> {
    store: JsonStore<S>,
}

impl<S: Storage> EncounterService<S> {
    pub fn new(store: JsonStore<S>) -> Self {
        Self { store }
    }

    /// The encounter being run right now, empty on first use.
    pub async fn current(&self) -> Encounter {
        self.store.load_or_default(CURRENT_ENCOUNTER_FILE).await
    }

    pub async fn store_current(&self, encounter: &Encounter) -> Result<()> {
        self.store.save(CURRENT_ENCOUNTER_FILE, encounter).await
    }

    pub async fn saved(&self) -> Vec<Encounter> {
        self.store.load_or_default(SAVED_ENCOUNTERS_FILE).await
    }

    pub async fn saved_names(&self) -> Vec<String> {
        self.saved().await.into_iter().map(|e| e.name).collect()
    }

    /// Upserts by name: a saved encounter with the same name is replaced in
    /// place, otherwise the encounter is appended. Returns true on replace.
    pub async fn save(&self, encounter: &Encounter) -> Result<bool> {
        let mut saved = self.saved().await;
        let replaced = match saved.iter().position(|e| e.name == encounter.name) {
            Some(index) => {
                saved[index] = encounter.clone();
                true
            }
            None => {
                saved.push(encounter.clone());
                false
            }
        };
        self.store.save(SAVED_ENCOUNTERS_FILE, &saved).await?;
        tracing::info!(
            "💾 {} encounter '{}' ({} creatures)",
            if replaced { "Updated" } else { "Saved" },
            encounter.name,
            encounter.creatures.len()
        );
        Ok(replaced)
    }

    /// Replaces the working encounter with a saved one.
    pub async fn load(&self, name: &str) -> Result<Encounter> {
        let encounter = self
            .saved()
            .await
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| DmError::NotFound {
                what: format!("Encounter '{}'", name),
            })?;
        self.store_current(&encounter).await?;
        tracing::info!("📂 Loaded encounter '{}'", name);
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_store::tests::MockStorage;
    use crate::domain::encounter::Creature;

    fn service() -> EncounterService<MockStorage> {
        EncounterService::new(JsonStore::new(MockStorage::default()))
    }

    #[tokio::test]
    async fn test_current_defaults_to_new_encounter() {
        let svc = service();
        let current = svc.current().await;
        assert_eq!(current.name, "New Encounter");
        assert!(current.creatures.is_empty());
    }

    #[tokio::test]
    async fn test_save_upserts_by_name() {
        let svc = service();
        let mut cave = Encounter::named("Cave");
        assert!(!svc.save(&cave).await.unwrap());
        assert!(!svc.save(&Encounter::named("Keep")).await.unwrap());

        cave.add_creature(Creature::new("Troll", 84, 15, 1, false).unwrap());
        assert!(svc.save(&cave).await.unwrap());

        let saved = svc.saved().await;
        assert_eq!(svc.saved_names().await, vec!["Cave", "Keep"]);
        assert_eq!(saved[0].creatures.len(), 1);
    }

    #[tokio::test]
    async fn test_load_replaces_current() {
        let svc = service();
        let mut keep = Encounter::named("Keep");
        keep.round_number = 3;
        svc.save(&keep).await.unwrap();
        svc.store_current(&Encounter::named("Scratch")).await.unwrap();

        let loaded = svc.load("Keep").await.unwrap();
        assert_eq!(loaded.round_number, 3);
        assert_eq!(svc.current().await.name, "Keep");

        assert!(matches!(
            svc.load("Nowhere").await,
            Err(DmError::NotFound { .. })
        ));
    }
}
