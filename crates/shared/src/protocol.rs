use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnobAction {
    RotateLeft,
    RotateRight,
    Push,
}

impl KnobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnobAction::RotateLeft => "rotate_left",
            KnobAction::RotateRight => "rotate_right",
            KnobAction::Push => "push",
        }
    }
}

impl fmt::Display for KnobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown knob action '{}' (expected left, right or push)",
            self.0
        )
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for KnobAction {
    type Err = UnknownAction;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "-" | "down" | "rotate_left" => Ok(KnobAction::RotateLeft),
            "r" | "right" | "+" | "up" | "rotate_right" => Ok(KnobAction::RotateRight),
            "p" | "push" | "select" | "enter" => Ok(KnobAction::Push),
            _ => Err(UnknownAction(raw.trim().to_string())),
        }
    }
}

/// Splits a script such as `"right, push r r push"` into actions.
pub fn parse_script(script: &str) -> Vec<Result<KnobAction, UnknownAction>> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSnapshot {
    pub phase: Phase,
    pub index: usize,
    pub total: usize,
    pub field: Option<String>,
    pub value: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub instructions: String,
    pub finished: bool,
}

impl SequenceSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
