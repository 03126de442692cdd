use std::fmt::Write;

use crate::core::balance::get_power_score_details;
use crate::core::dice::{DiceExpr, DiceRoll};
use crate::domain::encounter::{Creature, Encounter, HpBand};
use crate::domain::loot::{LootParameters, MagicItem, UsageLimit};

// 與 balance 的預設充能數一致
const DEFAULT_MAX_CHARGES: u8 = 7;

const BAR_WIDTH: usize = 20;

fn hp_bar(creature: &Creature) -> String {
    let filled = ((creature.hp_percentage() / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let fill_char = match creature.hp_band() {
        HpBand::Healthy => '█',
        HpBand::Wounded => '▓',
        HpBand::Critical => '░',
    };
    format!(
        "[{}{}]",
        fill_char.to_string().repeat(filled),
        " ".repeat(BAR_WIDTH - filled)
    )
}

fn status_suffix(creature: &Creature) -> &'static str {
    if creature.is_unconscious() {
        " (Unconscious)"
    } else if creature.is_bloodied() {
        " (Bloodied)"
    } else {
        ""
    }
}

pub fn render_encounter(encounter: &Encounter) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "⚔️  {} | Round {}", encounter.name, encounter.round_number);

    if encounter.creatures.is_empty() {
        let _ = writeln!(out, "No creatures in encounter. Add some with `encounter add`.");
        return out;
    }

    if encounter.is_active {
        if let Some(current) = encounter.current_creature() {
            let _ = writeln!(out, "Current Turn: {}", current.name);
        }
    }
    let _ = writeln!(out);

    for (i, creature) in encounter.creatures.iter().enumerate() {
        let marker = if encounter.is_active && i == encounter.current_turn_index {
            "▶"
        } else {
            " "
        };
        let icon = if creature.is_player { "🎮" } else { "👹" };
        let _ = writeln!(
            out,
            "{} #{:<2} {} {}{} | Init {} | AC {} | HP {}/{} {}",
            marker,
            i + 1,
            icon,
            creature.name,
            status_suffix(creature),
            creature.initiative,
            creature.armor_class,
            creature.current_hp,
            creature.max_hp,
            hp_bar(creature)
        );
        if !creature.conditions.is_empty() {
            let _ = writeln!(out, "       Conditions: {}", creature.conditions.join(", "));
        }
        if let Some(notes) = &creature.notes {
            let _ = writeln!(out, "       Notes: {}", notes);
        }
    }

    out
}

pub fn render_item(item: &MagicItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "✨ {}", item.name);
    let _ = writeln!(out, "{} ({}) - {}", item.subtype, item.item_type, item.rarity);

    if item.requires_attunement {
        match &item.attunement_requirement {
            Some(req) => {
                let _ = writeln!(out, "Requires Attunement ({})", req);
            }
            None => {
                let _ = writeln!(out, "Requires Attunement");
            }
        }
    }

    let _ = writeln!(out, "---");
    let _ = writeln!(out, "{}", item.description);

    if !item.properties.is_empty() {
        let _ = writeln!(out, "\nProperties:");
        for prop in &item.properties {
            let _ = writeln!(out, "- {}", prop);
        }
    }

    if let Some(curse) = &item.curse {
        let _ = writeln!(out, "---\nCurse: {}", curse);
    }

    if let Some(lore) = &item.lore {
        let _ = writeln!(out, "---\n{}", lore);
    }

    out
}

/// Power score analysis for the rarity chosen in `params`.
pub fn render_breakdown(params: &LootParameters) -> String {
    let details = get_power_score_details(params);
    let selected = params.rarity;
    let status = details.status_for(selected);
    let mut out = String::new();
    let _ = writeln!(out, "📊 Power Score Analysis");
    let _ = writeln!(
        out,
        "Power Score: {:.1} ({} for {})",
        details.power_score, status, selected
    );
    let verdict = if details.suggested_rarity == selected {
        "Match!".to_string()
    } else {
        format!("vs {}", selected)
    };
    let _ = writeln!(out, "Suggested Rarity: {} ({})", details.suggested_rarity, verdict);
    let _ = writeln!(out);
    let _ = writeln!(out, "Formula: [(ΔDPR × A × U) + D + C] × R − (Kₐ + Kₙ)");
    let rows = [
        ("ΔDPR", details.dpr, "Damage per round increase"),
        ("A", details.action_economy, "Action economy multiplier"),
        ("U", details.usage, "Usage multiplier"),
        ("D", details.defensive, "Defensive power"),
        ("C", details.control_utility, "Control/utility power"),
        ("R", details.reliability, "Reliability multiplier"),
        ("Kₐ", details.constraints, "Structural constraints (penalty)"),
        ("Kₙ", details.negative_effects, "Negative effects (penalty)"),
    ];
    for (symbol, value, description) in rows {
        let _ = writeln!(out, "  {:<5} {:>7.2}  {}", symbol, value, description);
    }

    if let Some(charges) = render_charges(params) {
        let _ = writeln!(out);
        let _ = write!(out, "{}", charges);
    }
    out
}

fn render_charges(params: &LootParameters) -> Option<String> {
    let limits = &params.usage_limits;
    if limits.limit_type != UsageLimit::Charges {
        return None;
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "🔋 Charges: {}",
        limits.max_charges.unwrap_or(DEFAULT_MAX_CHARGES)
    );
    if let Some(regain) = limits.regain_charges.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        match DiceExpr::find_in(regain) {
            Some(expr) => {
                let _ = writeln!(
                    out,
                    "Regain: {} ({}, range {}..={}, average {:.1})",
                    regain,
                    expr,
                    expr.min(),
                    expr.max(),
                    expr.average()
                );
            }
            None => {
                let _ = writeln!(out, "Regain: {}", regain);
            }
        }
    }
    Some(out)
}

pub fn render_roll(expr: &DiceExpr, roll: &DiceRoll) -> String {
    let dice = roll
        .rolls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if roll.modifier == 0 {
        format!("🎲 {} → [{}] = {}", expr, dice, roll.total)
    } else {
        format!(
            "🎲 {} → [{}] {:+} = {}",
            expr, dice, roll.modifier, roll.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loot::Rarity;

    #[test]
    fn test_render_encounter_marks_current_turn() {
        let mut encounter = Encounter::named("Bridge");
        encounter.add_creature(Creature::new("Fighter", 30, 18, 1, true).unwrap());
        let mut goblin = Creature::new("Goblin", 8, 15, 2, false).unwrap();
        goblin.apply_damage(4);
        goblin.add_condition("Prone");
        encounter.add_creature(goblin);
        encounter.is_active = true;
        encounter.next_turn();

        let out = render_encounter(&encounter);
        assert!(out.contains("Bridge | Round 1"));
        assert!(out.contains("Current Turn: Goblin"));
        assert!(out.contains("▶ #2"));
        assert!(out.contains("Goblin (Bloodied)"));
        assert!(out.contains("HP 4/8"));
        assert!(out.contains("Conditions: Prone"));
    }

    #[test]
    fn test_render_empty_encounter() {
        let out = render_encounter(&Encounter::default());
        assert!(out.contains("No creatures in encounter"));
    }

    #[test]
    fn test_render_item() {
        let item = MagicItem {
            name: "Emberfang".to_string(),
            item_type: "Weapon".to_string(),
            subtype: "Dagger".to_string(),
            rarity: "Rare".to_string(),
            requires_attunement: true,
            attunement_requirement: Some("by a rogue".to_string()),
            description: "A blade that never cools.".to_string(),
            properties: vec!["+1 to attack".to_string()],
            curse: None,
            lore: Some("Forged in a dying star.".to_string()),
        };
        let out = render_item(&item);
        assert!(out.contains("Dagger (Weapon) - Rare"));
        assert!(out.contains("Requires Attunement (by a rogue)"));
        assert!(out.contains("- +1 to attack"));
        assert!(!out.contains("Curse:"));
    }

    #[test]
    fn test_render_breakdown() {
        let mut params = LootParameters::default();
        params.passive_bonuses.ac_bonus = 1;
        params.rarity = Rarity::Uncommon;
        let out = render_breakdown(&params);
        assert!(out.contains("Power Score: 2.0 (Balanced for Uncommon)"));
        assert!(out.contains("Suggested Rarity: Uncommon (Match!)"));
        assert!(!out.contains("Charges"));
    }

    #[test]
    fn test_render_breakdown_charges() {
        let mut params = LootParameters::default();
        params.usage_limits.limit_type = UsageLimit::Charges;
        params.usage_limits.regain_charges = Some("1d6+1 at dawn".to_string());
        let out = render_breakdown(&params);
        assert!(out.contains("🔋 Charges: 7"));
        assert!(out.contains("Regain: 1d6+1 at dawn (1d6+1, range 2..=7, average 4.5)"));

        params.usage_limits.max_charges = Some(3);
        params.usage_limits.regain_charges = Some("all charges at dawn".to_string());
        let out = render_breakdown(&params);
        assert!(out.contains("🔋 Charges: 3"));
        assert!(out.contains("Regain: all charges at dawn\n"));
    }
}
