use rand::Rng;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::utils::error::{DmError, Result};

const MAX_DICE: u32 = 100;
const MAX_SIDES: u32 = 1000;

static EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d*)\s*[dD]\s*(\d+)\s*(?:([+-])\s*(\d+))?\s*$").expect("dice regex")
});

static EMBEDDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d*)[dD](\d+)(?:\s*([+-])\s*(\d+))?").expect("dice regex")
});

pub fn roll_d20<R: Rng>(rng: &mut R) -> i32 {
    rng.random_range(1..=20)
}

/// `NdM+K` dice notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i64,
}

impl DiceExpr {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Result<Self> {
        let input = format!("{}d{}{:+}", count, sides, modifier);
        if !(1..=MAX_DICE).contains(&count) {
            return Err(DmError::DiceParseError {
                input,
                reason: format!("dice count must be between 1 and {}", MAX_DICE),
            });
        }
        if !(2..=MAX_SIDES).contains(&sides) {
            return Err(DmError::DiceParseError {
                input,
                reason: format!("die sides must be between 2 and {}", MAX_SIDES),
            });
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// First dice expression inside free text, e.g. "1d6+1 at dawn".
    pub fn find_in(text: &str) -> Option<Self> {
        EMBEDDED
            .captures(text)
            .and_then(|caps| Self::from_captures(text, &caps).ok())
    }

    fn from_captures(input: &str, caps: &Captures<'_>) -> Result<Self> {
        let bad = |reason: &str| DmError::DiceParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let count = match caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            Some(n) => n.parse::<u32>().map_err(|_| bad("dice count is too large"))?,
            None => 1,
        };
        let sides = caps[2]
            .parse::<u32>()
            .map_err(|_| bad("die sides is too large"))?;
        let modifier = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => {
                let value = value
                    .as_str()
                    .parse::<i32>()
                    .map_err(|_| bad("modifier is too large"))?;
                if sign.as_str() == "-" {
                    -value
                } else {
                    value
                }
            }
            _ => 0,
        };

        Self::new(count, sides, modifier).map_err(|e| match e {
            DmError::DiceParseError { reason, .. } => bad(&reason),
            other => other,
        })
    }

    pub fn roll<R: Rng>(&self, rng: &mut R) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides))
            .collect();
        let total = rolls.iter().map(|&r| r as i64).sum::<i64>() + self.modifier as i64;
        DiceRoll {
            rolls,
            modifier: self.modifier,
            total,
        }
    }

    pub fn min(&self) -> i64 {
        self.count as i64 + self.modifier as i64
    }

    pub fn max(&self) -> i64 {
        self.count as i64 * self.sides as i64 + self.modifier as i64
    }

    pub fn average(&self) -> f64 {
        self.count as f64 * (self.sides as f64 + 1.0) / 2.0 + self.modifier as f64
    }
}

impl FromStr for DiceExpr {
    type Err = DmError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = EXACT.captures(s).ok_or_else(|| DmError::DiceParseError {
            input: s.to_string(),
            reason: "expected NdM or NdM+K".to_string(),
        })?;
        Self::from_captures(s, &caps)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}
