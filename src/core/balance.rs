//! Power balance scoring for magic items.
//!
//! `Power = [(ΔDPR × A × U) + D + C] × R − (Kₐ + Kₙ)`, never below zero.
//!
//! - ΔDPR: damage per round increase
//! - A: action economy multiplier
//! - U: usage multiplier
//! - D: defensive power
//! - C: control/utility power
//! - R: reliability multiplier
//! - Kₐ: structural constraints (attunement, restrictions)
//! - Kₙ: negative effects (curses, drawbacks)

use serde::Serialize;

use crate::domain::loot::{ActionEconomy, LootParameters, Rarity, TriggerType, UsageLimit};

const RELIABILITY_AUTOMATIC: f64 = 1.0;
const RELIABILITY_ATTACK_ROLL: f64 = 0.65;
const RELIABILITY_SAVE_DC: f64 = 0.6;

const AC_BONUS_VALUE: f64 = 2.0;
const RESISTANCE_VALUE: f64 = 3.0;
const IMMUNITY_VALUE: f64 = 5.0;

const CONDITION_WITH_SAVE: f64 = 2.0;
const UTILITY_BASE: f64 = 1.5;

const ATTUNEMENT_PENALTY: f64 = 1.0;
const CLASS_RESTRICTION_PENALTY: f64 = 0.5;
const ALIGNMENT_RESTRICTION_PENALTY: f64 = 0.3;

const MINOR_CURSE_PENALTY: f64 = 1.0;
const MAJOR_CURSE_PENALTY: f64 = 3.0;
const SIDE_EFFECT_PENALTY: f64 = 0.5;
const MAJOR_CURSE_WORDS: &[&str] = &["death", "kill", "destroy", "permanent"];

const PASSIVE_TRIGGERS: &[TriggerType] = &[
    TriggerType::AlwaysActive,
    TriggerType::OnHit,
    TriggerType::WhenHit,
];

pub fn action_economy_multiplier(economy: ActionEconomy) -> f64 {
    match economy {
        ActionEconomy::Free => 1.5,
        ActionEconomy::BonusAction => 1.2,
        ActionEconomy::Reaction => 1.0,
        ActionEconomy::Action => 0.8,
    }
}

fn base_usage_multiplier(limit: UsageLimit) -> f64 {
    match limit {
        UsageLimit::AtWill => 1.0,
        UsageLimit::PerShortRest => 0.7,
        UsageLimit::PerLongRest => 0.4,
        UsageLimit::Charges => 0.5,
        UsageLimit::SingleUse => 0.1,
    }
}

/// Half-open `[min, max)` power band for a rarity.
pub fn rarity_power_range(rarity: Rarity) -> (f64, f64) {
    match rarity {
        Rarity::Common => (0.0, 2.0),
        Rarity::Uncommon => (2.0, 5.0),
        Rarity::Rare => (5.0, 10.0),
        Rarity::VeryRare => (10.0, 18.0),
        Rarity::Legendary => (18.0, 30.0),
        Rarity::Artifact => (30.0, 100.0),
    }
}

/// ΔDPR. +1 attack is worth about 1 DPR, +1 damage about 0.5.
pub fn calculate_dpr(params: &LootParameters) -> f64 {
    let bonuses = &params.passive_bonuses;
    let mut dpr = bonuses.attack_bonus as f64 * 1.0 + bonuses.damage_bonus as f64 * 0.5;

    if params.active_effect.enabled {
        if let Some(level) = params.active_effect.spell_level {
            dpr += level as f64 * 1.5;
        }
    }

    dpr
}

pub fn get_action_economy_multiplier(params: &LootParameters) -> f64 {
    if params.triggers.iter().any(|t| PASSIVE_TRIGGERS.contains(t)) {
        return action_economy_multiplier(ActionEconomy::Free);
    }

    if params.active_effect.enabled {
        return action_economy_multiplier(params.active_effect.action_economy);
    }

    if params.passive_bonuses.has_numeric_bonus() {
        return action_economy_multiplier(ActionEconomy::Free);
    }

    1.0
}

pub fn get_usage_multiplier(params: &LootParameters) -> f64 {
    let limits = &params.usage_limits;
    match limits.limit_type {
        UsageLimit::Charges => {
            let charges = limits.max_charges.unwrap_or(7) as f64;
            (0.3 + charges * 0.05).min(1.0)
        }
        UsageLimit::PerLongRest | UsageLimit::PerShortRest => {
            let uses = limits.uses_per_rest.unwrap_or(1) as f64;
            (base_usage_multiplier(limits.limit_type) + uses * 0.05).min(1.0)
        }
        other => base_usage_multiplier(other),
    }
}

pub fn calculate_defensive_power(params: &LootParameters) -> f64 {
    let props = &params.additional_properties;
    params.passive_bonuses.ac_bonus as f64 * AC_BONUS_VALUE
        + props.resistances.len() as f64 * RESISTANCE_VALUE
        + props.immunities.len() as f64 * IMMUNITY_VALUE
}

pub fn calculate_control_utility(params: &LootParameters) -> f64 {
    let mut c = params.additional_properties.conditions_inflicted.len() as f64 * CONDITION_WITH_SAVE
        + params.passive_bonuses.saving_throw_bonuses.len() as f64 * UTILITY_BASE
        + params.passive_bonuses.ability_bonuses.len() as f64 * UTILITY_BASE;

    if params.active_effect.enabled && params.active_effect.named_spell().is_some() {
        c += UTILITY_BASE * 2.0;
    }

    c
}

pub fn get_reliability_multiplier(params: &LootParameters) -> f64 {
    if params.passive_bonuses.has_numeric_bonus() {
        RELIABILITY_AUTOMATIC
    } else if !params.additional_properties.conditions_inflicted.is_empty() {
        RELIABILITY_SAVE_DC
    } else if params.active_effect.enabled {
        RELIABILITY_ATTACK_ROLL
    } else {
        RELIABILITY_AUTOMATIC
    }
}

pub fn calculate_structural_constraints(params: &LootParameters) -> f64 {
    let mut ka = 0.0;
    if params.requires_attunement {
        ka += ATTUNEMENT_PENALTY;
    }
    ka + params.restrictions.class_restrictions.len() as f64 * CLASS_RESTRICTION_PENALTY
        + params.restrictions.alignment_restrictions.len() as f64 * ALIGNMENT_RESTRICTION_PENALTY
}

pub fn calculate_negative_effects(params: &LootParameters) -> f64 {
    let restrictions = &params.restrictions;
    let mut kn = 0.0;

    if restrictions.has_curse {
        let desc = restrictions
            .curse_description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        kn += if MAJOR_CURSE_WORDS.iter().any(|w| desc.contains(w)) {
            MAJOR_CURSE_PENALTY
        } else {
            MINOR_CURSE_PENALTY
        };
    }

    kn + restrictions.side_effects.len() as f64 * SIDE_EFFECT_PENALTY
}

pub fn calculate_power_score(params: &LootParameters) -> f64 {
    PowerBreakdown::compute(params).raw_score
}

/// First rarity whose band contains the score, Artifact past the top.
pub fn get_suggested_rarity(power_score: f64) -> Rarity {
    Rarity::ALL
        .iter()
        .copied()
        .find(|r| {
            let (min, max) = rarity_power_range(*r);
            min <= power_score && power_score < max
        })
        .unwrap_or(Rarity::Artifact)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceStatus {
    Underpowered,
    Balanced,
    Overpowered,
}

impl std::fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BalanceStatus::Underpowered => "Underpowered",
            BalanceStatus::Balanced => "Balanced",
            BalanceStatus::Overpowered => "Overpowered",
        };
        f.write_str(label)
    }
}

/// Compares a score against the band of the rarity the DM picked.
pub fn balance_status(power_score: f64, selected: Rarity) -> BalanceStatus {
    let (min, max) = rarity_power_range(selected);
    if power_score < min {
        BalanceStatus::Underpowered
    } else if power_score > max {
        BalanceStatus::Overpowered
    } else {
        BalanceStatus::Balanced
    }
}

/// Every term of the formula, rounded to two decimals for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerBreakdown {
    pub dpr: f64,
    pub action_economy: f64,
    pub usage: f64,
    pub defensive: f64,
    pub control_utility: f64,
    pub reliability: f64,
    pub constraints: f64,
    pub negative_effects: f64,
    pub power_score: f64,
    pub suggested_rarity: Rarity,
    #[serde(skip)]
    raw_score: f64,
}

impl PowerBreakdown {
    pub fn compute(params: &LootParameters) -> Self {
        let dpr = calculate_dpr(params);
        let a = get_action_economy_multiplier(params);
        let u = get_usage_multiplier(params);
        let d = calculate_defensive_power(params);
        let c = calculate_control_utility(params);
        let r = get_reliability_multiplier(params);
        let ka = calculate_structural_constraints(params);
        let kn = calculate_negative_effects(params);

        let raw_score = (((dpr * a * u) + d + c) * r - (ka + kn)).max(0.0);

        Self {
            dpr: round2(dpr),
            action_economy: round2(a),
            usage: round2(u),
            defensive: round2(d),
            control_utility: round2(c),
            reliability: round2(r),
            constraints: round2(ka),
            negative_effects: round2(kn),
            power_score: round2(raw_score),
            suggested_rarity: get_suggested_rarity(raw_score),
            raw_score,
        }
    }

    /// Judged on the displayed (rounded) score.
    pub fn status_for(&self, selected: Rarity) -> BalanceStatus {
        balance_status(self.power_score, selected)
    }
}

pub fn get_power_score_details(params: &LootParameters) -> PowerBreakdown {
    PowerBreakdown::compute(params)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
