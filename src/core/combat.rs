use rand::Rng;
use std::cmp::Reverse;

use crate::core::dice::roll_d20;
use crate::domain::encounter::{Creature, Encounter};
use crate::domain::reference::{lookup, CONDITIONS};
use crate::utils::error::Result;

/// d20 + initiative modifier.
pub fn roll_initiative<R: Rng>(creature: &Creature, rng: &mut R) -> i32 {
    roll_d20(rng) + creature.initiative_modifier
}

/// Highest initiative first. Ties go to the higher modifier, then players,
/// then a coin flip.
pub fn sort_by_initiative<R: Rng>(creatures: Vec<Creature>, rng: &mut R) -> Vec<Creature> {
    let mut keyed: Vec<_> = creatures
        .into_iter()
        .map(|c| {
            let key = (
                Reverse(c.initiative),
                Reverse(c.initiative_modifier),
                !c.is_player,
                rng.random::<u64>(),
            );
            (key, c)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, c)| c).collect()
}

/// Rolls for everyone, sorts and starts combat at the top of the order.
pub fn roll_all_initiative<R: Rng>(encounter: &mut Encounter, rng: &mut R) {
    for creature in encounter.creatures.iter_mut() {
        creature.initiative = roll_initiative(creature, rng);
        tracing::debug!(
            "🎲 {} rolled initiative {} (mod {:+})",
            creature.name,
            creature.initiative,
            creature.initiative_modifier
        );
    }
    let creatures = std::mem::take(&mut encounter.creatures);
    encounter.creatures = sort_by_initiative(creatures, rng);
    encounter.current_turn_index = 0;
    encounter.is_active = true;
}

/// Resolves a condition name to its canonical 5e spelling.
pub fn resolve_condition(name: &str) -> Result<&'static str> {
    lookup("condition", CONDITIONS, name)
}

#[derive(Debug, Default)]
pub struct QuickAddResult {
    pub creatures: Vec<Creature>,
    pub unparsed: Vec<String>,
}

/// Parses `name, hp, ac[, init_mod]` lines. Blank lines are skipped and bad
/// lines are collected instead of failing the whole batch.
pub fn parse_quick_add(text: &str) -> QuickAddResult {
    let mut result = QuickAddResult::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_quick_add_line(line) {
            Some(creature) => result.creatures.push(creature),
            None => {
                tracing::warn!("⚠️ Could not parse: {}", line);
                result.unparsed.push(line.to_string());
            }
        }
    }

    result
}

fn parse_quick_add_line(line: &str) -> Option<Creature> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }
    let hp = parts[1].parse::<u32>().ok()?;
    let ac = parts[2].parse::<u32>().ok()?;
    let init_mod = match parts.get(3) {
        Some(raw) => raw.parse::<i32>().ok()?,
        None => 0,
    };
    Creature::new(parts[0], hp, ac, init_mod, false).ok()
}
