use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::character::{Attributes, Character, EconomyDelta};

/// Growth applied to the experience ceiling on each level-up, in percent.
const CEILING_GROWTH_PERCENT: i128 = 115;
/// Flat amount added to the ceiling after growth.
const CEILING_GROWTH_FLAT: i64 = 25;

/// How negative balances are treated after deltas are applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorPolicy {
    /// Experience, gold and attributes may go below zero.
    #[default]
    Permissive,
    /// Experience, gold and attributes are clamped at zero.
    ClampToZero,
}

impl FromStr for FloorPolicy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" | "none" | "" => Ok(Self::Permissive),
            "clamp" | "clamp_to_zero" | "zero" => Ok(Self::ClampToZero),
            other => Err(anyhow::anyhow!("unknown floor policy `{other}`")),
        }
    }
}

impl fmt::Display for FloorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::ClampToZero => f.write_str("clamp"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressionEngine {
    floor_policy: FloorPolicy,
}

impl ProgressionEngine {
    pub fn new(floor_policy: FloorPolicy) -> Self {
        Self { floor_policy }
    }

    pub fn floor_policy(&self) -> FloorPolicy {
        self.floor_policy
    }

    /// Apply every delta in one unit and resolve any resulting level-ups.
    pub fn apply_deltas(&self, character: Character, delta: &EconomyDelta) -> Character {
        let mut next = character;

        next.experience = next.experience.saturating_add(delta.xp_delta);
        next.currency = next.currency.saturating_add(delta.gold_delta);
        next.attributes = Attributes {
            strength: next.attributes.strength.saturating_add(delta.strength_delta),
            dexterity: next.attributes.dexterity.saturating_add(delta.dexterity_delta),
            intelligence: next
                .attributes
                .intelligence
                .saturating_add(delta.intelligence_delta),
            wisdom: next.attributes.wisdom.saturating_add(delta.wisdom_delta),
            charisma: next.attributes.charisma.saturating_add(delta.charisma_delta),
        };

        if self.floor_policy == FloorPolicy::ClampToZero {
            clamp_to_zero(&mut next);
        }

        resolve_level_ups(&mut next);
        next
    }
}

fn clamp_to_zero(character: &mut Character) {
    character.experience = character.experience.max(0);
    character.currency = character.currency.max(0);

    let attributes = &mut character.attributes;
    for score in [
        &mut attributes.strength,
        &mut attributes.dexterity,
        &mut attributes.intelligence,
        &mut attributes.wisdom,
        &mut attributes.charisma,
    ] {
        *score = (*score).max(0);
    }
}

/// Ceiling that follows `ceiling` after one level-up: `floor(ceiling * 1.15) + 25`.
///
/// Computed in exact integer arithmetic and saturating at `i64::MAX`.
pub fn next_ceiling(ceiling: i64) -> i64 {
    let grown = i128::from(ceiling) * CEILING_GROWTH_PERCENT / 100;
    i64::try_from(grown)
        .unwrap_or(i64::MAX)
        .saturating_add(CEILING_GROWTH_FLAT)
}

/// Convert surplus experience into levels. Returns the number of levels gained.
///
/// Negative experience never enters the loop and is left untouched.
pub fn resolve_level_ups(character: &mut Character) -> u32 {
    let mut gained = 0_u32;

    while character.experience >= character.experience_ceiling {
        character.experience -= character.experience_ceiling;
        character.level = character.level.saturating_add(1);
        character.experience_ceiling = next_ceiling(character.experience_ceiling);
        gained = gained.saturating_add(1);
    }

    gained
}
