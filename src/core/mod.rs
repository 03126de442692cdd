pub mod balance;
pub mod combat;
pub mod dice;
pub mod generator;
pub mod prompts;

pub use crate::domain::encounter::{Creature, Encounter};
pub use crate::domain::loot::{LootParameters, MagicItem, QuickLootParameters};
pub use crate::domain::ports::{ItemGenerator, Storage};
pub use crate::utils::error::Result;
