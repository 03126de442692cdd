//! Static 5e reference tables.

use crate::utils::error::{DmError, Result};

pub const CONDITIONS: &[&str] = &[
    "Blinded",
    "Charmed",
    "Deafened",
    "Exhaustion",
    "Frightened",
    "Grappled",
    "Incapacitated",
    "Invisible",
    "Paralyzed",
    "Petrified",
    "Poisoned",
    "Prone",
    "Restrained",
    "Stunned",
    "Unconscious",
];

pub const DAMAGE_TYPES: &[&str] = &[
    "Acid",
    "Bludgeoning",
    "Cold",
    "Fire",
    "Force",
    "Lightning",
    "Necrotic",
    "Piercing",
    "Poison",
    "Psychic",
    "Radiant",
    "Slashing",
    "Thunder",
];

pub const ABILITY_SCORES: &[&str] = &[
    "Strength",
    "Dexterity",
    "Constitution",
    "Intelligence",
    "Wisdom",
    "Charisma",
];

pub const CLASSES: &[&str] = &[
    "Artificer",
    "Barbarian",
    "Bard",
    "Cleric",
    "Druid",
    "Fighter",
    "Monk",
    "Paladin",
    "Ranger",
    "Rogue",
    "Sorcerer",
    "Warlock",
    "Wizard",
];

pub const ALIGNMENTS: &[&str] = &[
    "Lawful Good",
    "Neutral Good",
    "Chaotic Good",
    "Lawful Neutral",
    "True Neutral",
    "Chaotic Neutral",
    "Lawful Evil",
    "Neutral Evil",
    "Chaotic Evil",
];

/// Case-insensitive lookup returning the canonical spelling.
pub fn canonical(table: &'static [&'static str], value: &str) -> Option<&'static str> {
    let value = value.trim();
    table
        .iter()
        .copied()
        .find(|entry| entry.eq_ignore_ascii_case(value))
}

/// "+2 STR" style label used for ability score bonuses.
pub fn ability_bonus_label(ability: &str, bonus: u8) -> String {
    let short: String = ability.chars().take(3).collect();
    format!("+{} {}", bonus, short.to_uppercase())
}

/// Like [`canonical`], but an unknown value is a validation error naming `what`.
pub fn lookup(what: &str, table: &'static [&'static str], value: &str) -> Result<&'static str> {
    canonical(table, value).ok_or_else(|| DmError::ValidationError {
        message: format!(
            "unknown {} '{}', expected one of: {}",
            what,
            value.trim(),
            table.join(", ")
        ),
    })
}

/// Every entry of `values` in canonical spelling.
pub fn lookup_all(
    what: &str,
    table: &'static [&'static str],
    values: &[String],
) -> Result<Vec<String>> {
    values
        .iter()
        .map(|v| lookup(what, table, v).map(str::to_string))
        .collect()
}

/// Accepts "+2 STR", "2 str" or "+1 Wisdom" and returns the "+N ABC" label.
/// Ability bonuses are +1 or +2.
pub fn canonical_ability_bonus(value: &str) -> Result<String> {
    let invalid = || DmError::ValidationError {
        message: format!(
            "invalid ability bonus '{}', expected e.g. \"+2 STR\" (bonus 1-2, one of: {})",
            value.trim(),
            ABILITY_SCORES.join(", ")
        ),
    };

    let mut parts = value.split_whitespace();
    let (Some(raw_bonus), Some(raw_ability), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let bonus = raw_bonus
        .trim_start_matches('+')
        .parse::<u8>()
        .ok()
        .filter(|b| (1..=2).contains(b))
        .ok_or_else(invalid)?;
    let ability = ABILITY_SCORES
        .iter()
        .find(|a| a.eq_ignore_ascii_case(raw_ability) || a[..3].eq_ignore_ascii_case(raw_ability))
        .ok_or_else(invalid)?;

    Ok(ability_bonus_label(ability, bonus))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(CONDITIONS.len(), 15);
        assert_eq!(DAMAGE_TYPES.len(), 13);
        assert_eq!(ABILITY_SCORES.len(), 6);
        assert_eq!(ALIGNMENTS.len(), 9);
    }

    #[test]
    fn test_canonical_lookup() {
        assert_eq!(canonical(CONDITIONS, "prone"), Some("Prone"));
        assert_eq!(canonical(CONDITIONS, " POISONED "), Some("Poisoned"));
        assert_eq!(canonical(CONDITIONS, "sleepy"), None);
    }

    #[test]
    fn test_lookup_reports_unknown_value() {
        assert_eq!(lookup("damage type", DAMAGE_TYPES, "fire").unwrap(), "Fire");
        let err = lookup("damage type", DAMAGE_TYPES, "Banana").unwrap_err();
        assert!(err.to_string().contains("unknown damage type 'Banana'"));

        let names = lookup_all("class", CLASSES, &["paladin".into(), "WIZARD".into()]).unwrap();
        assert_eq!(names, vec!["Paladin", "Wizard"]);
    }

    #[test]
    fn test_canonical_ability_bonus() {
        assert_eq!(canonical_ability_bonus("+2 STR").unwrap(), "+2 STR");
        assert_eq!(canonical_ability_bonus("1 wisdom").unwrap(), "+1 WIS");
        assert_eq!(canonical_ability_bonus(" +1  dex ").unwrap(), "+1 DEX");
        assert!(canonical_ability_bonus("+3 STR").is_err());
        assert!(canonical_ability_bonus("+1 LCK").is_err());
        assert!(canonical_ability_bonus("STR").is_err());
        assert!(canonical_ability_bonus("+1 STR extra").is_err());
    }

    #[test]
    fn test_ability_bonus_label() {
        assert_eq!(ability_bonus_label("Strength", 2), "+2 STR");
        assert_eq!(ability_bonus_label("Wisdom", 1), "+1 WIS");
    }
}
