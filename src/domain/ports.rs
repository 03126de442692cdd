use crate::domain::loot::{LootParameters, MagicItem, QuickLootParameters};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Produces finished magic items from loot parameters.
#[async_trait]
pub trait ItemGenerator: Send + Sync {
    async fn generate_item(&self, params: &LootParameters) -> Result<MagicItem>;
    async fn generate_quick_item(&self, params: &QuickLootParameters) -> Result<MagicItem>;
}
