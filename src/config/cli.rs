use crate::domain::loot::{ItemType, Rarity};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dm-toolkit")]
#[command(about = "Dungeon master helpers: encounter tracker, loot creator and dice roller")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./dm-toolkit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory from config
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Track initiative, HP and conditions for a combat
    Encounter {
        #[command(subcommand)]
        action: EncounterCommand,
    },
    /// Create and balance magic items
    Loot {
        #[command(subcommand)]
        action: LootCommand,
    },
    /// Roll dice, e.g. `dice 2d6+3`
    Dice {
        expr: String,
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// List SRD monster templates
    Monsters {
        #[arg(long)]
        search: Option<String>,
    },
}

/// Commands that only read or archive the working encounter.
#[derive(Debug, Clone, Subcommand)]
pub enum EncounterCommand {
    Show,
    /// Save the working encounter (replaces a saved one with the same name)
    Save,
    Load {
        name: String,
    },
    List,
    #[command(flatten)]
    Edit(EncounterEdit),
}

/// Changes to the working encounter. Creature positions are 1-based, as shown
/// by `encounter show`.
#[derive(Debug, Clone, Subcommand)]
pub enum EncounterEdit {
    /// Start a fresh working encounter
    New {
        #[arg(default_value = "New Encounter")]
        name: String,
    },
    Rename {
        name: String,
    },
    /// Add a creature, optionally pre-filled from an SRD monster
    Add {
        #[arg(long)]
        monster: Option<String>,
        #[arg(long, required_unless_present = "monster")]
        name: Option<String>,
        #[arg(long)]
        hp: Option<u32>,
        #[arg(long)]
        ac: Option<u32>,
        #[arg(long, allow_hyphen_values = true)]
        init_mod: Option<i32>,
        #[arg(long)]
        player: bool,
    },
    /// Add several creatures, one `name, hp, ac[, init_mod]` per line
    QuickAdd {
        lines: Vec<String>,
        #[arg(long, conflicts_with = "lines")]
        file: Option<PathBuf>,
    },
    Remove {
        position: usize,
    },
    /// Roll initiative for everyone and start combat
    Roll,
    Next,
    Prev,
    Reset,
    Damage {
        position: usize,
        amount: u32,
    },
    Heal {
        position: usize,
        amount: u32,
    },
    FullHeal {
        position: usize,
    },
    Condition {
        position: usize,
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
    Note {
        position: usize,
        /// Omit to clear the note
        text: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LootCommand {
    /// Pick a rarity and describe the item, the AI handles the rest
    Quick {
        #[arg(long, default_value = "Uncommon")]
        rarity: Rarity,
        /// Free-text theme, e.g. "fire sword for a paladin"
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        save: bool,
    },
    /// Generate from a full TOML parameter file
    Generate {
        #[arg(long)]
        params: PathBuf,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        save: bool,
    },
    /// Power score analysis without calling the AI
    Score {
        #[arg(long)]
        params: PathBuf,
    },
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    /// Valid subtypes for an item type
    Subtypes {
        item_type: ItemType,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SavedCommand {
    List,
    Delete { position: usize },
}
