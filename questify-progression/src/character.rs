use serde::{Deserialize, Serialize};

pub const STARTING_LEVEL: i64 = 1;
pub const STARTING_EXPERIENCE_CEILING: i64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i64,
    pub dexterity: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
}

/// Progression-relevant subset of a user profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub level: i64,
    #[serde(rename = "xp")]
    pub experience: i64,
    #[serde(rename = "xp_max")]
    pub experience_ceiling: i64,
    #[serde(rename = "gold")]
    pub currency: i64,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Character {
    /// Fresh character as created at signup.
    pub fn new_default() -> Self {
        Self {
            level: STARTING_LEVEL,
            experience: 0,
            experience_ceiling: STARTING_EXPERIENCE_CEILING,
            currency: 0,
            attributes: Attributes::default(),
        }
    }
}

impl Default for Character {
    fn default() -> Self {
        Self::new_default()
    }
}

/// Signed adjustments for one economy update. Missing fields default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyDelta {
    pub xp_delta: i64,
    pub gold_delta: i64,
    pub strength_delta: i64,
    pub dexterity_delta: i64,
    pub intelligence_delta: i64,
    pub wisdom_delta: i64,
    pub charisma_delta: i64,
}

impl EconomyDelta {
    pub fn experience(amount: i64) -> Self {
        Self {
            xp_delta: amount,
            ..Self::default()
        }
    }

    pub fn currency(amount: i64) -> Self {
        Self {
            gold_delta: amount,
            ..Self::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
