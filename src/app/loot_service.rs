use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::json_store::JsonStore;
use crate::domain::loot::MagicItem;
use crate::domain::ports::Storage;
use crate::utils::error::{DmError, Result};

pub const SAVED_ITEMS_FILE: &str = "saved_items.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    #[serde(flatten)]
    pub item: MagicItem,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// The DM's collection of generated items.
pub struct ItemCollection<S: Storage> {
    store: JsonStore<S>,
}

impl<S: Storage> ItemCollection<S> {
    pub fn new(store: JsonStore<S>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<SavedItem> {
        self.store.load_or_default(SAVED_ITEMS_FILE).await
    }

    pub async fn save(&self, item: &MagicItem) -> Result<usize> {
        let mut items = self.list().await;
        items.push(SavedItem {
            item: item.clone(),
            saved_at: Some(Utc::now()),
        });
        self.store.save(SAVED_ITEMS_FILE, &items).await?;
        tracing::info!("💾 Saved '{}' to collection", item.name);
        Ok(items.len())
    }

    pub async fn delete(&self, index: usize) -> Result<SavedItem> {
        let mut items = self.list().await;
        if index >= items.len() {
            return Err(DmError::NotFound {
                what: format!("Saved item #{} (collection has {})", index, items.len()),
            });
        }
        let removed = items.remove(index);
        self.store.save(SAVED_ITEMS_FILE, &items).await?;
        tracing::info!("🗑️ Deleted '{}' from collection", removed.item.name);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_store::tests::MockStorage;

    fn item(name: &str) -> MagicItem {
        MagicItem {
            name: name.to_string(),
            item_type: "Ring".to_string(),
            subtype: "Ring".to_string(),
            rarity: "Rare".to_string(),
            requires_attunement: true,
            attunement_requirement: None,
            description: "Glows faintly.".to_string(),
            properties: vec![],
            curse: None,
            lore: None,
        }
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let collection = ItemCollection::new(JsonStore::new(MockStorage::default()));
        assert_eq!(collection.save(&item("Ring of Embers")).await.unwrap(), 1);
        assert_eq!(collection.save(&item("Ring of Frost")).await.unwrap(), 2);

        let removed = collection.delete(0).await.unwrap();
        assert_eq!(removed.item.name, "Ring of Embers");

        let remaining = collection.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item.name, "Ring of Frost");
        assert!(remaining[0].saved_at.is_some());

        assert!(collection.delete(5).await.is_err());
    }

    #[tokio::test]
    async fn test_reads_entries_without_timestamp() {
        let storage = MockStorage::default();
        storage
            .put(
                SAVED_ITEMS_FILE,
                br#"[{"name":"Old Cloak","item_type":"Wondrous Item","subtype":"Cloak","rarity":"Common","requires_attunement":false,"description":"Warm."}]"#,
            )
            .await;
        let collection = ItemCollection::new(JsonStore::new(storage));
        let items = collection.list().await;
        assert_eq!(items[0].item.name, "Old Cloak");
        assert!(items[0].saved_at.is_none());
    }
}
