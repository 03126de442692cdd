use crate::domain::loot::{LootParameters, QuickLootParameters, UsageLimit};

const DESIGNER_PREAMBLE: &str = "You are an expert D&D 5th Edition magic item designer.";
const DEFAULT_QUICK_THEME: &str = "a mysterious and interesting magic item";

fn json_contract(rarity_line: &str, item_type_line: &str, subtype_line: &str) -> Vec<String> {
    vec![
        "```json".to_string(),
        "{".to_string(),
        r#"  "name": "Creative item name","#.to_string(),
        format!(r#"  "item_type": "{}","#, item_type_line),
        format!(r#"  "subtype": "{}","#, subtype_line),
        format!(r#"  "rarity": "{}","#, rarity_line),
        r#"  "requires_attunement": true/false,"#.to_string(),
        r#"  "attunement_requirement": "Optional requirement like class or alignment, or null","#
            .to_string(),
        r#"  "description": "Full mechanical description of the item including all properties and effects","#
            .to_string(),
        r#"  "properties": ["List", "of", "individual", "properties"],"#.to_string(),
        r#"  "curse": "Description of the curse if applicable, or null","#.to_string(),
        r#"  "lore": "A short paragraph of flavor text about the item's history or origin""#
            .to_string(),
        "}".to_string(),
        "```".to_string(),
    ]
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(format!("## {}", title));
}

/// Prompt for the detailed mode. Sections without content are left out.
pub fn build_item_prompt(params: &LootParameters) -> String {
    let mut lines = vec![
        format!(
            "{} Create a unique and balanced magic item based on the following specifications.",
            DESIGNER_PREAMBLE
        ),
        String::new(),
        "## Base Identity".to_string(),
        format!("- Item Type: {}", params.item_type),
        format!("- Subtype: {}", params.item_subtype),
        format!("- Rarity: {}", params.rarity),
        format!(
            "- Requires Attunement: {}",
            if params.requires_attunement { "Yes" } else { "No" }
        ),
    ];

    let bonuses = &params.passive_bonuses;
    if !bonuses.is_empty() {
        section(&mut lines, "Passive Numerical Bonuses");
        if bonuses.attack_bonus > 0 {
            lines.push(format!("- +{} to attack rolls", bonuses.attack_bonus));
        }
        if bonuses.damage_bonus > 0 {
            lines.push(format!("- +{} to damage", bonuses.damage_bonus));
        }
        if bonuses.ac_bonus > 0 {
            lines.push(format!("- +{} to Armor Class", bonuses.ac_bonus));
        }
        lines.extend(bonuses.ability_bonuses.iter().map(|b| format!("- {}", b)));
        lines.extend(bonuses.saving_throw_bonuses.iter().map(|b| format!("- {}", b)));
    }

    let effect = &params.active_effect;
    if let (true, Some(spell)) = (effect.enabled, effect.named_spell()) {
        section(&mut lines, "Active Effects");
        lines.push(format!("- Spell-like Effect: {}", spell));
        if let Some(level) = effect.spell_level {
            lines.push(format!("- Spell Level/Power Tier: {}", level));
        }
        lines.push(format!("- Action Economy: {}", effect.action_economy));
        lines.push(format!("- Target Type: {}", effect.target_type));
    }

    let limits = &params.usage_limits;
    if limits.limit_type != UsageLimit::AtWill {
        section(&mut lines, "Usage Limits");
        lines.push(format!("- Limit Type: {}", limits.limit_type));
        if let Some(uses) = limits.uses_per_rest {
            lines.push(format!("- Uses: {} per rest", uses));
        }
        if let Some(charges) = limits.max_charges {
            lines.push(format!("- Maximum Charges: {}", charges));
        }
        if let Some(regain) = limits.regain_charges.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("- Charge Regain: {}", regain));
        }
    }

    if !params.triggers.is_empty() {
        section(&mut lines, "Triggers");
        lines.extend(params.triggers.iter().map(|t| format!("- {}", t)));
    }

    let props = &params.additional_properties;
    if !props.is_empty() {
        section(&mut lines, "Additional Properties");
        if let Some(damage_type) = &props.damage_type_change {
            lines.push(format!("- Damage Type: {}", damage_type));
        }
        lines.extend(props.resistances.iter().map(|r| format!("- Resistance to {}", r)));
        lines.extend(props.immunities.iter().map(|i| format!("- Immunity to {}", i)));
        lines.extend(
            props
                .conditions_inflicted
                .iter()
                .map(|c| format!("- Can inflict: {}", c)),
        );
        if let Some(visual) = &props.visual_effects {
            lines.push(format!("- Visual Theme: {}", visual));
        }
    }

    let rest = &params.restrictions;
    if !rest.is_empty() {
        section(&mut lines, "Restrictions & Costs");
        lines.extend(
            rest.class_restrictions
                .iter()
                .map(|c| format!("- Class Restriction: {} only", c)),
        );
        lines.extend(
            rest.alignment_restrictions
                .iter()
                .map(|a| format!("- Alignment Restriction: {}", a)),
        );
        if rest.has_curse {
            lines.push("- This item IS CURSED".to_string());
            if let Some(curse) = rest.curse_description.as_deref().filter(|s| !s.is_empty()) {
                lines.push(format!("- Curse Theme: {}", curse));
            }
        }
        lines.extend(rest.side_effects.iter().map(|s| format!("- Side Effect: {}", s)));
    }

    if let Some(theme) = params.theme_keywords.as_deref().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push(format!("## Theme/Flavor Keywords: {}", theme));
    }

    if let Some(notes) = params.power_level_notes.as_deref().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push(format!("## Power Level Notes: {}", notes));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "Generate a complete magic item with the following structure. Be creative with the name and lore, but ensure the mechanics match the specifications above.".to_string(),
        String::new(),
        "Respond in this exact JSON format:".to_string(),
    ]);
    lines.extend(json_contract("The rarity", "The item type", "The subtype"));
    lines.extend([
        String::new(),
        "Ensure the item is balanced for D&D 5th Edition based on its rarity. Make the name evocative and memorable.".to_string(),
    ]);

    lines.join("\n")
}

/// Prompt for quick mode, the model picks type, subtype and mechanics.
pub fn build_quick_item_prompt(params: &QuickLootParameters) -> String {
    let theme = match params.theme_description.trim() {
        "" => DEFAULT_QUICK_THEME,
        t => t,
    };

    let mut lines = vec![
        format!(
            "{} Create a unique and balanced magic item based on minimal input.",
            DESIGNER_PREAMBLE
        ),
        String::new(),
        "## Requirements".to_string(),
        format!("- **Rarity:** {}", params.rarity),
        format!("- **Theme/Description:** {}", theme),
        String::new(),
        "## Your Task".to_string(),
        "Based on the theme description, decide:".to_string(),
        "1. What type of item this should be (weapon, armor, ring, wondrous item, potion, scroll, etc.)".to_string(),
        "2. The specific subtype (longsword, cloak, amulet, etc.)".to_string(),
        "3. Whether it requires attunement".to_string(),
        "4. All mechanical properties appropriate for the rarity level".to_string(),
        "5. Any special effects, bonuses, or abilities".to_string(),
        "6. Creative name and backstory".to_string(),
        String::new(),
        "## Rarity Guidelines".to_string(),
        "- Common: Minor cosmetic or utility effects".to_string(),
        "- Uncommon: +1 bonuses or simple magical effects".to_string(),
        "- Rare: +2 bonuses or moderate magical effects, may require attunement".to_string(),
        "- Very Rare: +3 bonuses or powerful effects, usually requires attunement".to_string(),
        "- Legendary: Multiple powerful effects, always requires attunement".to_string(),
        "- Artifact: World-changing power with significant drawbacks".to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
        "Respond in this exact JSON format:".to_string(),
    ];
    lines.extend(json_contract(
        params.rarity.as_str(),
        "The item type (Weapon, Armor, Ring, Wondrous Item, Potion, Scroll)",
        "The specific subtype",
    ));
    lines.extend([
        String::new(),
        "Be creative and make the item feel magical and unique while staying balanced for its rarity level.".to_string(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loot::{Rarity, TriggerType};

    #[test]
    fn test_minimal_prompt_has_only_base_identity() {
        let prompt = build_item_prompt(&LootParameters::default());
        assert!(prompt.contains("- Item Type: Weapon"));
        assert!(prompt.contains("- Subtype: Longsword"));
        assert!(prompt.contains("- Rarity: Uncommon"));
        assert!(prompt.contains("- Requires Attunement: No"));
        assert!(!prompt.contains("## Passive Numerical Bonuses"));
        assert!(!prompt.contains("## Active Effects"));
        assert!(!prompt.contains("## Usage Limits"));
        assert!(!prompt.contains("## Restrictions & Costs"));
        assert!(prompt.contains("Respond in this exact JSON format:"));
        assert!(prompt.contains(r#""rarity": "The rarity","#));
        assert!(prompt.contains(r#""subtype": "The subtype","#));
        assert!(!prompt.contains("The specific subtype"));
    }

    #[test]
    fn test_full_prompt_sections() {
        let mut params = LootParameters::default();
        params.passive_bonuses.attack_bonus = 2;
        params.passive_bonuses.ability_bonuses = vec!["+2 STR".to_string()];
        params.active_effect.enabled = true;
        params.active_effect.spell_name = Some("Fireball".to_string());
        params.active_effect.spell_level = Some(3);
        params.usage_limits.limit_type = UsageLimit::Charges;
        params.usage_limits.max_charges = Some(7);
        params.usage_limits.regain_charges = Some("1d6+1 at dawn".to_string());
        params.triggers = vec![TriggerType::OnCritical];
        params.additional_properties.resistances = vec!["Fire".to_string()];
        params.restrictions.has_curse = true;
        params.restrictions.curse_description = Some("binds to wielder".to_string());
        params.theme_keywords = Some("phoenix, rebirth".to_string());

        let prompt = build_item_prompt(&params);
        assert!(prompt.contains("- +2 to attack rolls"));
        assert!(prompt.contains("- +2 STR"));
        assert!(prompt.contains("- Spell-like Effect: Fireball"));
        assert!(prompt.contains("- Spell Level/Power Tier: 3"));
        assert!(prompt.contains("- Action Economy: Action"));
        assert!(prompt.contains("- Limit Type: Charges"));
        assert!(prompt.contains("- Charge Regain: 1d6+1 at dawn"));
        assert!(prompt.contains("## Triggers\n- On Critical Hit"));
        assert!(prompt.contains("- Resistance to Fire"));
        assert!(prompt.contains("- This item IS CURSED"));
        assert!(prompt.contains("- Curse Theme: binds to wielder"));
        assert!(prompt.contains("## Theme/Flavor Keywords: phoenix, rebirth"));
    }

    #[test]
    fn test_active_effect_without_name_is_omitted() {
        let mut params = LootParameters::default();
        params.active_effect.enabled = true;
        params.active_effect.spell_name = Some("   ".to_string());
        assert!(!build_item_prompt(&params).contains("## Active Effects"));
    }

    #[test]
    fn test_quick_prompt() {
        let prompt = build_quick_item_prompt(&QuickLootParameters {
            rarity: Rarity::VeryRare,
            theme_description: "  ice dagger for a rogue ".to_string(),
        });
        assert!(prompt.contains("- **Rarity:** Very Rare"));
        assert!(prompt.contains("- **Theme/Description:** ice dagger for a rogue"));
        assert!(prompt.contains(r#""rarity": "Very Rare","#));
        assert!(prompt.contains(r#""subtype": "The specific subtype","#));

        let blank = build_quick_item_prompt(&QuickLootParameters::default());
        assert!(blank.contains(DEFAULT_QUICK_THEME));
    }
}
