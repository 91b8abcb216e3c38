use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::task::TaskKind;

pub const DEFAULT_QUEST_DIFFICULTY: i32 = 2;

/// Guild rank of a quest, lowest `E` to highest `S`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestRank {
    #[default]
    E,
    D,
    C,
    B,
    A,
    S,
}

impl QuestRank {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::D => "D",
            Self::C => "C",
            Self::B => "B",
            Self::A => "A",
            Self::S => "S",
        }
    }
}

impl fmt::Display for QuestRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestRank {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "E" => Ok(Self::E),
            "D" => Ok(Self::D),
            "C" => Ok(Self::C),
            "B" => Ok(Self::B),
            "A" => Ok(Self::A),
            "S" => Ok(Self::S),
            other => Err(anyhow::anyhow!("unknown quest rank `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub rank: QuestRank,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub due_at: Option<String>,
    pub repeats_rule: Option<String>,
    pub difficulty: i32,
    pub is_negative: bool,
    pub created_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuest {
    pub title: String,
    pub kind: TaskKind,
    pub rank: QuestRank,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub due_at: Option<String>,
    pub repeats_rule: Option<String>,
    pub difficulty: i32,
    pub is_negative: bool,
}

#[cfg(test)]
mod tests {
    use super::QuestRank;
    use crate::model::task::TaskKind;

    #[test]
    fn ranks_parse_and_order() {
        assert_eq!("s".parse::<QuestRank>().unwrap(), QuestRank::S);
        assert_eq!(" b ".parse::<QuestRank>().unwrap(), QuestRank::B);
        assert!("F".parse::<QuestRank>().is_err());
        assert!(QuestRank::E < QuestRank::S);
        assert_eq!(QuestRank::default(), QuestRank::E);
    }

    #[test]
    fn task_kinds_parse() {
        assert_eq!("Daily".parse::<TaskKind>().unwrap(), TaskKind::Daily);
        assert_eq!(TaskKind::default(), TaskKind::Todo);
        assert_eq!(TaskKind::Habit.to_string(), "habit");
        assert!("weekly".parse::<TaskKind>().is_err());
    }
}
