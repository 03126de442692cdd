use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::reference::{
    canonical_ability_bonus, lookup, lookup_all, ALIGNMENTS, CLASSES, CONDITIONS, DAMAGE_TYPES,
};
use crate::utils::error::{DmError, Result};
use crate::utils::validation::{validate_optional_range, validate_range, Validate};

/// Enum whose serialized form is the human label shown to players.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DmError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize_label(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_label(v.as_str()) == wanted)
                    .ok_or_else(|| DmError::ValidationError {
                        message: format!(
                            "unknown {} '{}', expected one of: {}",
                            stringify!($name),
                            s,
                            $name::ALL
                                .iter()
                                .map(|v| v.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    })
            }
        }
    };
}

// "very-rare", "Very_Rare" and "very rare" all name the same label
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

labeled_enum!(
    /// Main item categories.
    ItemType {
        Weapon => "Weapon",
        Armor => "Armor",
        Ring => "Ring",
        WondrousItem => "Wondrous Item",
        Potion => "Potion",
        Scroll => "Scroll",
    }
);

labeled_enum!(
    ItemSubtype {
        // weapons
        Longsword => "Longsword",
        Shortsword => "Shortsword",
        Greatsword => "Greatsword",
        Dagger => "Dagger",
        Battleaxe => "Battleaxe",
        Greataxe => "Greataxe",
        Warhammer => "Warhammer",
        Maul => "Maul",
        Spear => "Spear",
        Halberd => "Halberd",
        Longbow => "Longbow",
        Shortbow => "Shortbow",
        Crossbow => "Crossbow",
        Staff => "Staff",
        Mace => "Mace",
        Flail => "Flail",
        Rapier => "Rapier",
        Scimitar => "Scimitar",
        Trident => "Trident",
        // armor
        PlateArmor => "Plate Armor",
        ChainMail => "Chain Mail",
        ScaleMail => "Scale Mail",
        LeatherArmor => "Leather Armor",
        StuddedLeather => "Studded Leather",
        Shield => "Shield",
        Helmet => "Helmet",
        Gauntlets => "Gauntlets",
        Boots => "Boots",
        // wondrous
        Cloak => "Cloak",
        Amulet => "Amulet",
        Belt => "Belt",
        Bracers => "Bracers",
        Circlet => "Circlet",
        Gloves => "Gloves",
        Goggles => "Goggles",
        Hat => "Hat",
        Robe => "Robe",
        Bag => "Bag",
        Cape => "Cape",
        Mantle => "Mantle",
        Ring => "Ring",
        Potion => "Potion",
        Scroll => "Scroll",
    }
);

labeled_enum!(
    Rarity {
        Common => "Common",
        Uncommon => "Uncommon",
        Rare => "Rare",
        VeryRare => "Very Rare",
        Legendary => "Legendary",
        Artifact => "Artifact",
    }
);

labeled_enum!(
    /// Action cost of an active effect.
    ActionEconomy {
        Action => "Action",
        BonusAction => "Bonus Action",
        Reaction => "Reaction",
        Free => "Free Action",
    }
);

labeled_enum!(
    TargetType {
        SelfOnly => "Self",
        SingleTarget => "Single Target",
        Area => "Area",
        MultipleTargets => "Multiple Targets",
    }
);

labeled_enum!(
    UsageLimit {
        AtWill => "At-Will",
        PerLongRest => "Per Long Rest",
        PerShortRest => "Per Short Rest",
        Charges => "Charges",
        SingleUse => "Single Use",
    }
);

labeled_enum!(
    TriggerType {
        OnHit => "On Hit",
        WhenHit => "When You Are Hit",
        AtZeroHp => "When You Drop to 0 HP",
        AsReaction => "As a Reaction When...",
        AtDawn => "At Dawn",
        AtDusk => "At Dusk",
        OnCritical => "On Critical Hit",
        AlwaysActive => "Always Active (Passive)",
    }
);

impl ItemType {
    pub fn subtypes(&self) -> &'static [ItemSubtype] {
        use ItemSubtype::*;
        match self {
            ItemType::Weapon => &[
                Longsword, Shortsword, Greatsword, Dagger, Battleaxe, Greataxe, Warhammer, Maul,
                Spear, Halberd, Longbow, Shortbow, Crossbow, Staff, Mace, Flail, Rapier,
                Scimitar, Trident,
            ],
            ItemType::Armor => &[
                PlateArmor,
                ChainMail,
                ScaleMail,
                LeatherArmor,
                StuddedLeather,
                Shield,
                Helmet,
                Gauntlets,
                Boots,
            ],
            ItemType::Ring => &[Ring],
            ItemType::WondrousItem => &[
                Cloak, Amulet, Belt, Bracers, Circlet, Gloves, Goggles, Hat, Robe, Bag, Cape,
                Mantle,
            ],
            ItemType::Potion => &[Potion],
            ItemType::Scroll => &[Scroll],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassiveBonuses {
    pub attack_bonus: u8,
    pub damage_bonus: u8,
    pub ac_bonus: u8,
    /// e.g. "+2 STR"
    pub ability_bonuses: Vec<String>,
    pub saving_throw_bonuses: Vec<String>,
}

impl PassiveBonuses {
    pub fn has_numeric_bonus(&self) -> bool {
        self.attack_bonus > 0 || self.damage_bonus > 0 || self.ac_bonus > 0
    }

    pub fn is_empty(&self) -> bool {
        !self.has_numeric_bonus()
            && self.ability_bonuses.is_empty()
            && self.saving_throw_bonuses.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveEffect {
    pub enabled: bool,
    pub spell_name: Option<String>,
    pub spell_level: Option<u8>,
    pub action_economy: ActionEconomy,
    pub target_type: TargetType,
}

impl Default for ActiveEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            spell_name: None,
            spell_level: None,
            action_economy: ActionEconomy::Action,
            target_type: TargetType::SelfOnly,
        }
    }
}

impl ActiveEffect {
    pub fn named_spell(&self) -> Option<&str> {
        self.spell_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLimits {
    pub limit_type: UsageLimit,
    pub uses_per_rest: Option<u8>,
    pub max_charges: Option<u8>,
    /// e.g. "1d6+1 at dawn"
    pub regain_charges: Option<String>,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            limit_type: UsageLimit::AtWill,
            uses_per_rest: None,
            max_charges: None,
            regain_charges: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalProperties {
    pub damage_type_change: Option<String>,
    pub resistances: Vec<String>,
    pub immunities: Vec<String>,
    pub conditions_inflicted: Vec<String>,
    pub visual_effects: Option<String>,
}

impl AdditionalProperties {
    pub fn is_empty(&self) -> bool {
        self.damage_type_change.is_none()
            && self.resistances.is_empty()
            && self.immunities.is_empty()
            && self.conditions_inflicted.is_empty()
            && self.visual_effects.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restrictions {
    pub class_restrictions: Vec<String>,
    pub alignment_restrictions: Vec<String>,
    pub has_curse: bool,
    pub curse_description: Option<String>,
    pub side_effects: Vec<String>,
}

impl Restrictions {
    pub fn is_empty(&self) -> bool {
        self.class_restrictions.is_empty()
            && self.alignment_restrictions.is_empty()
            && !self.has_curse
            && self.side_effects.is_empty()
    }
}

/// Everything the detailed loot mode lets a DM pin down about an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootParameters {
    pub item_type: ItemType,
    pub item_subtype: ItemSubtype,
    pub rarity: Rarity,
    pub requires_attunement: bool,
    pub passive_bonuses: PassiveBonuses,
    pub active_effect: ActiveEffect,
    pub usage_limits: UsageLimits,
    pub triggers: Vec<TriggerType>,
    pub additional_properties: AdditionalProperties,
    pub restrictions: Restrictions,
    /// e.g. "fire, phoenix, rebirth"
    pub theme_keywords: Option<String>,
    pub power_level_notes: Option<String>,
}

impl Default for LootParameters {
    fn default() -> Self {
        Self {
            item_type: ItemType::Weapon,
            item_subtype: ItemSubtype::Longsword,
            rarity: Rarity::Uncommon,
            requires_attunement: false,
            passive_bonuses: PassiveBonuses::default(),
            active_effect: ActiveEffect::default(),
            usage_limits: UsageLimits::default(),
            triggers: Vec::new(),
            additional_properties: AdditionalProperties::default(),
            restrictions: Restrictions::default(),
            theme_keywords: None,
            power_level_notes: None,
        }
    }
}

impl LootParameters {
    /// 從 TOML 字串解析物品參數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: Self = toml::from_str(content).map_err(|e| DmError::ConfigValidationError {
            field: "loot_parameters".to_string(),
            message: format!("TOML parsing error: {}", e),
        })?;
        let params = params.normalized()?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Rewrites damage types, conditions, classes, alignments and ability
    /// bonuses to their 5e spelling. Unknown entries are rejected.
    pub fn normalized(mut self) -> Result<Self> {
        let props = &mut self.additional_properties;
        props.damage_type_change = props
            .damage_type_change
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("none"))
            .map(|d| lookup("damage type", DAMAGE_TYPES, d).map(str::to_string))
            .transpose()?;
        props.resistances = lookup_all("damage type", DAMAGE_TYPES, &props.resistances)?;
        props.immunities = lookup_all("damage type", DAMAGE_TYPES, &props.immunities)?;
        props.conditions_inflicted = lookup_all("condition", CONDITIONS, &props.conditions_inflicted)?;

        let rest = &mut self.restrictions;
        rest.class_restrictions = lookup_all("class", CLASSES, &rest.class_restrictions)?;
        rest.alignment_restrictions =
            lookup_all("alignment", ALIGNMENTS, &rest.alignment_restrictions)?;

        self.passive_bonuses.ability_bonuses = self
            .passive_bonuses
            .ability_bonuses
            .iter()
            .map(|b| canonical_ability_bonus(b))
            .collect::<Result<_>>()?;

        Ok(self)
    }
}

impl Validate for LootParameters {
    fn validate(&self) -> Result<()> {
        if !self.item_type.subtypes().contains(&self.item_subtype) {
            return Err(DmError::ValidationError {
                message: format!(
                    "subtype '{}' is not a valid {}",
                    self.item_subtype, self.item_type
                ),
            });
        }

        let bonuses = &self.passive_bonuses;
        validate_range("passive_bonuses.attack_bonus", bonuses.attack_bonus, 0, 3)?;
        validate_range("passive_bonuses.damage_bonus", bonuses.damage_bonus, 0, 3)?;
        validate_range("passive_bonuses.ac_bonus", bonuses.ac_bonus, 0, 3)?;

        validate_optional_range("active_effect.spell_level", self.active_effect.spell_level, 1, 9)?;
        validate_optional_range("usage_limits.uses_per_rest", self.usage_limits.uses_per_rest, 1, 10)?;
        validate_optional_range("usage_limits.max_charges", self.usage_limits.max_charges, 1, 20)?;

        // 參考表欄位 (傷害類型、狀態、職業、陣營、屬性加值)
        self.clone().normalized()?;

        Ok(())
    }
}

/// Quick mode: only rarity and a free-text theme, the model decides the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickLootParameters {
    pub rarity: Rarity,
    /// e.g. "fire sword for a paladin"
    pub theme_description: String,
}

impl Default for QuickLootParameters {
    fn default() -> Self {
        Self {
            rarity: Rarity::Uncommon,
            theme_description: String::new(),
        }
    }
}

/// A generated magic item as shown and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicItem {
    pub name: String,
    pub item_type: String,
    pub subtype: String,
    pub rarity: String,
    pub requires_attunement: bool,
    #[serde(default)]
    pub attunement_requirement: Option<String>,
    pub description: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub curse: Option<String>,
    #[serde(default)]
    pub lore: Option<String>,
}
