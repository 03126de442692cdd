use serde::{Deserialize, Serialize};

use crate::utils::error::{DmError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

/// A combatant tracked in an encounter: player, enemy or NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub initiative_modifier: i32,
    pub current_hp: u32,
    pub max_hp: u32,
    #[serde(default = "default_armor_class")]
    pub armor_class: u32,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_armor_class() -> u32 {
    10
}

/// Health bar colour bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpBand {
    /// above 50%
    Healthy,
    /// above 25%
    Wounded,
    Critical,
}

impl Creature {
    /// New creature at full health with no initiative rolled yet.
    pub fn new(
        name: impl Into<String>,
        max_hp: u32,
        armor_class: u32,
        initiative_modifier: i32,
        is_player: bool,
    ) -> Result<Self> {
        let creature = Self {
            name: name.into().trim().to_string(),
            initiative: 0,
            initiative_modifier,
            current_hp: max_hp,
            max_hp,
            armor_class,
            is_player,
            conditions: Vec::new(),
            notes: None,
        };
        creature.validate()?;
        Ok(creature)
    }

    pub fn hp_percentage(&self) -> f64 {
        (self.current_hp as f64 / self.max_hp as f64) * 100.0
    }

    pub fn is_bloodied(&self) -> bool {
        (self.current_hp as f64) <= self.max_hp as f64 / 2.0
    }

    pub fn is_unconscious(&self) -> bool {
        self.current_hp == 0
    }

    pub fn hp_band(&self) -> HpBand {
        let pct = self.hp_percentage();
        if pct > 50.0 {
            HpBand::Healthy
        } else if pct > 25.0 {
            HpBand::Wounded
        } else {
            HpBand::Critical
        }
    }

    pub fn apply_damage(&mut self, damage: u32) {
        self.current_hp = self.current_hp.saturating_sub(damage);
    }

    pub fn apply_healing(&mut self, healing: u32) {
        self.current_hp = self.current_hp.saturating_add(healing).min(self.max_hp);
    }

    pub fn full_heal(&mut self) {
        self.current_hp = self.max_hp;
    }

    /// Returns false when the condition was already present.
    pub fn add_condition(&mut self, condition: &str) -> bool {
        if self.conditions.iter().any(|c| c == condition) {
            return false;
        }
        self.conditions.push(condition.to_string());
        true
    }

    /// Returns false when the condition was not present.
    pub fn remove_condition(&mut self, condition: &str) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c != condition);
        self.conditions.len() != before
    }
}

impl Validate for Creature {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        if self.max_hp < 1 {
            return Err(DmError::ValidationError {
                message: format!("{}: max_hp must be at least 1", self.name),
            });
        }
        if self.current_hp > self.max_hp {
            return Err(DmError::ValidationError {
                message: format!(
                    "{}: current_hp {} exceeds max_hp {}",
                    self.name, self.current_hp, self.max_hp
                ),
            });
        }
        Ok(())
    }
}

/// Initiative order and turn state for one combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    #[serde(default = "default_encounter_name")]
    pub name: String,
    #[serde(default)]
    pub creatures: Vec<Creature>,
    #[serde(default)]
    pub current_turn_index: usize,
    #[serde(default = "default_round")]
    pub round_number: u32,
    #[serde(default)]
    pub is_active: bool,
}

fn default_encounter_name() -> String {
    "New Encounter".to_string()
}

fn default_round() -> u32 {
    1
}

impl Default for Encounter {
    fn default() -> Self {
        Self {
            name: default_encounter_name(),
            creatures: Vec::new(),
            current_turn_index: 0,
            round_number: 1,
            is_active: false,
        }
    }
}

impl Encounter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn current_creature(&self) -> Option<&Creature> {
        self.creatures.get(self.current_turn_index)
    }

    pub fn next_turn(&mut self) {
        if self.creatures.is_empty() {
            return;
        }

        self.current_turn_index += 1;
        if self.current_turn_index >= self.creatures.len() {
            self.current_turn_index = 0;
            self.round_number += 1;
        }
    }

    pub fn prev_turn(&mut self) {
        if self.creatures.is_empty() {
            return;
        }

        if self.current_turn_index == 0 {
            self.current_turn_index = self.creatures.len() - 1;
            self.round_number = self.round_number.saturating_sub(1).max(1);
        } else {
            self.current_turn_index -= 1;
        }
    }

    /// Back to round 1, first turn. Creatures are left untouched.
    pub fn reset_combat(&mut self) {
        self.current_turn_index = 0;
        self.round_number = 1;
        self.is_active = false;
    }

    pub fn add_creature(&mut self, creature: Creature) {
        self.creatures.push(creature);
    }

    /// Out of range indices are ignored.
    pub fn remove_creature(&mut self, index: usize) -> Option<Creature> {
        if index >= self.creatures.len() {
            return None;
        }
        let removed = self.creatures.remove(index);
        if self.current_turn_index >= self.creatures.len() {
            self.current_turn_index = self.creatures.len().saturating_sub(1);
        }
        Some(removed)
    }

    pub fn creature_mut(&mut self, index: usize) -> Result<&mut Creature> {
        let len = self.creatures.len();
        self.creatures
            .get_mut(index)
            .ok_or_else(|| DmError::NotFound {
                what: format!("Creature #{} (encounter has {})", index, len),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin(name: &str) -> Creature {
        Creature::new(name, 7, 15, 2, false).unwrap()
    }

    fn encounter_of(n: usize) -> Encounter {
        let mut encounter = Encounter::named("Ambush");
        for i in 0..n {
            encounter.add_creature(goblin(&format!("Goblin {}", i + 1)));
        }
        encounter
    }

    #[test]
    fn test_hp_status() {
        let mut c = Creature::new("Orc", 15, 13, 1, false).unwrap();
        assert_eq!(c.current_hp, 15);
        assert!(!c.is_bloodied());
        assert_eq!(c.hp_band(), HpBand::Healthy);

        c.apply_damage(8);
        assert_eq!(c.current_hp, 7);
        // 7 <= 7.5
        assert!(c.is_bloodied());
        assert_eq!(c.hp_band(), HpBand::Wounded);

        c.apply_damage(100);
        assert_eq!(c.current_hp, 0);
        assert!(c.is_unconscious());
        assert_eq!(c.hp_band(), HpBand::Critical);

        c.apply_healing(100);
        assert_eq!(c.current_hp, 15);
    }

    #[test]
    fn test_creature_validation() {
        assert!(Creature::new("", 10, 10, 0, false).is_err());
        assert!(Creature::new("Ghost", 0, 10, 0, false).is_err());
    }

    #[test]
    fn test_conditions_are_unique() {
        let mut c = goblin("Goblin");
        assert!(c.add_condition("Prone"));
        assert!(!c.add_condition("Prone"));
        assert_eq!(c.conditions, vec!["Prone".to_string()]);
        assert!(c.remove_condition("Prone"));
        assert!(!c.remove_condition("Prone"));
    }

    #[test]
    fn test_turn_cycle_advances_round() {
        let mut e = encounter_of(3);
        e.next_turn();
        e.next_turn();
        assert_eq!(e.current_turn_index, 2);
        assert_eq!(e.round_number, 1);
        e.next_turn();
        assert_eq!(e.current_turn_index, 0);
        assert_eq!(e.round_number, 2);
    }

    #[test]
    fn test_prev_turn_never_drops_below_round_one() {
        let mut e = encounter_of(2);
        e.prev_turn();
        assert_eq!(e.current_turn_index, 1);
        assert_eq!(e.round_number, 1);

        e.next_turn();
        assert_eq!(e.round_number, 2);
        e.prev_turn();
        assert_eq!(e.current_turn_index, 1);
        assert_eq!(e.round_number, 1);
    }

    #[test]
    fn test_turns_on_empty_encounter_are_noops() {
        let mut e = Encounter::default();
        e.next_turn();
        e.prev_turn();
        assert_eq!(e.current_turn_index, 0);
        assert_eq!(e.round_number, 1);
        assert!(e.current_creature().is_none());
    }

    #[test]
    fn test_remove_creature_clamps_turn_index() {
        let mut e = encounter_of(3);
        e.current_turn_index = 2;
        assert!(e.remove_creature(2).is_some());
        assert_eq!(e.current_turn_index, 1);

        assert!(e.remove_creature(10).is_none());
        assert_eq!(e.creatures.len(), 2);

        e.remove_creature(0);
        e.remove_creature(0);
        assert_eq!(e.current_turn_index, 0);
        assert!(e.creatures.is_empty());
    }

    #[test]
    fn test_reset_keeps_creatures() {
        let mut e = encounter_of(2);
        e.is_active = true;
        e.next_turn();
        e.next_turn();
        e.reset_combat();
        assert_eq!(e.round_number, 1);
        assert_eq!(e.current_turn_index, 0);
        assert!(!e.is_active);
        assert_eq!(e.creatures.len(), 2);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let e: Encounter = serde_json::from_str(
            r#"{"creatures":[{"name":"Wolf","current_hp":11,"max_hp":11}]}"#,
        )
        .unwrap();
        assert_eq!(e.name, "New Encounter");
        assert_eq!(e.round_number, 1);
        assert_eq!(e.creatures[0].armor_class, 10);
        assert!(!e.creatures[0].is_player);
    }
}
