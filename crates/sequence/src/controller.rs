//! The forward-only state machine over an ordered list of fields.

use std::collections::HashSet;

use shared::{
    domain::{FieldIndex, FieldValue, Phase},
    error::SequenceError,
    protocol::{KnobAction, SequenceSnapshot},
};
use tracing::{debug, info};

use crate::{
    field::{FieldSpec, FieldState, LockedFields},
    result::ComposedResult,
};

pub const DEFAULT_TERMINAL_INSTRUCTIONS: &str = "Press select to view the result...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Advanced { locked: FieldValue, next: FieldIndex },
    Finished { locked: FieldValue },
    Summary(ComposedResult),
}

impl SelectOutcome {
    pub fn summary(&self) -> Option<&ComposedResult> {
        match self {
            SelectOutcome::Summary(result) => Some(result),
            _ => None,
        }
    }

    pub fn locked(&self) -> Option<&FieldValue> {
        match self {
            SelectOutcome::Advanced { locked, .. } | SelectOutcome::Finished { locked } => {
                Some(locked)
            }
            SelectOutcome::Summary(_) => None,
        }
    }
}

/// Owns every field state. `fields` holds the locked fields followed by the
/// active one; a field only gets a state once everything before it is locked.
#[derive(Debug, Clone)]
pub struct SequenceController {
    specs: Vec<FieldSpec>,
    fields: Vec<FieldState>,
    phase: Phase,
    terminal_instructions: String,
}

impl SequenceController {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, SequenceError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name().to_string()) {
                return Err(SequenceError::invalid_field(
                    spec.name(),
                    "duplicate field name",
                ));
            }
        }

        let mut controller = Self {
            specs,
            fields: Vec::new(),
            phase: Phase::Terminal,
            terminal_instructions: DEFAULT_TERMINAL_INSTRUCTIONS.to_string(),
        };
        if let Some(first) = controller.specs.first() {
            let state = FieldState::activate(first, &LockedFields::empty());
            controller.fields.push(state);
            controller.phase = Phase::Editing(FieldIndex(0));
        }
        info!(
            fields = controller.specs.len(),
            instructions = controller.current_instructions(),
            "sequence started"
        );
        Ok(controller)
    }

    pub fn with_terminal_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.terminal_instructions = instructions.into();
        self
    }

    pub fn rotate_up(&mut self) {
        match self.phase {
            Phase::Editing(index) => self.fields[index.0].increment(),
            Phase::Terminal => debug!("rotate_up ignored in terminal phase"),
        }
    }

    pub fn rotate_down(&mut self) {
        match self.phase {
            Phase::Editing(index) => self.fields[index.0].decrement(),
            Phase::Terminal => debug!("rotate_down ignored in terminal phase"),
        }
    }

    pub fn select(&mut self) -> SelectOutcome {
        let index = match self.phase {
            Phase::Editing(index) => index,
            Phase::Terminal => {
                let result = self.compose();
                info!(result = %result, "composed result");
                return SelectOutcome::Summary(result);
            }
        };

        let active = &self.fields[index.0];
        let locked = FieldValue::new(active.name(), active.current_value());
        info!(field = %locked.name, value = locked.value, "field locked");

        let next = FieldIndex(index.0 + 1);
        match self.specs.get(next.0) {
            Some(spec) => {
                let state = FieldState::activate(spec, &LockedFields::new(&self.fields));
                self.fields.push(state);
                self.phase = Phase::Editing(next);
                debug!(instructions = self.current_instructions(), "next field");
                SelectOutcome::Advanced { locked, next }
            }
            None => {
                self.phase = Phase::Terminal;
                info!(
                    instructions = self.terminal_instructions.as_str(),
                    "sequence finished"
                );
                SelectOutcome::Finished { locked }
            }
        }
    }

    pub fn apply(&mut self, action: KnobAction) -> Option<SelectOutcome> {
        match action {
            KnobAction::RotateLeft => {
                self.rotate_down();
                None
            }
            KnobAction::RotateRight => {
                self.rotate_up();
                None
            }
            KnobAction::Push => Some(self.select()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Position in `[0, total]`; `total` means terminal. Never decreases.
    pub fn current_index(&self) -> usize {
        self.phase.position(self.specs.len())
    }

    pub fn total(&self) -> usize {
        self.specs.len()
    }

    pub fn current_field(&self) -> Option<&FieldState> {
        match self.phase {
            Phase::Editing(index) => self.fields.get(index.0),
            Phase::Terminal => None,
        }
    }

    pub fn current_instructions(&self) -> &str {
        match self.current_field() {
            Some(field) => field.instructions(),
            None => &self.terminal_instructions,
        }
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn compose_result(&self) -> Result<ComposedResult, SequenceError> {
        if !self.is_finished() {
            return Err(SequenceError::invalid_state(format!(
                "sequence is still editing field {} of {}",
                self.current_index() + 1,
                self.total()
            )));
        }
        Ok(self.compose())
    }

    fn compose(&self) -> ComposedResult {
        ComposedResult::new(
            self.fields
                .iter()
                .map(|field| FieldValue::new(field.name(), field.current_value()))
                .collect(),
        )
    }

    pub fn snapshot(&self) -> SequenceSnapshot {
        let field = self.current_field();
        SequenceSnapshot {
            phase: self.phase,
            index: self.current_index(),
            total: self.total(),
            field: field.map(|f| f.name().to_string()),
            value: field.map(FieldState::current_value),
            min: field.map(FieldState::min),
            max: field.map(FieldState::max),
            instructions: self.current_instructions().to_string(),
            finished: self.is_finished(),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
