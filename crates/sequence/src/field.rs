use std::fmt;

use shared::error::SequenceError;
use tracing::{debug, warn};

pub type DeriveBound = fn(&LockedFields<'_>) -> i64;

#[derive(Clone, Copy)]
pub enum Bound {
    Fixed(i64),
    /// Resolved once, when the owning field becomes active.
    Derived(DeriveBound),
}

impl Bound {
    pub fn resolve(&self, locked: &LockedFields<'_>) -> i64 {
        match self {
            Bound::Fixed(value) => *value,
            Bound::Derived(derive) => derive(locked),
        }
    }

    pub fn fixed(&self) -> Option<i64> {
        match self {
            Bound::Fixed(value) => Some(*value),
            Bound::Derived(_) => None,
        }
    }
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Bound::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    initial_value: i64,
    min: Bound,
    max: Bound,
    instructions: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, initial_value: i64, min: i64, max: i64) -> Self {
        let name = name.into();
        let instructions = format!("Please set the {}...", name.to_lowercase());
        Self {
            name,
            initial_value,
            min: Bound::Fixed(min),
            max: Bound::Fixed(max),
            instructions,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_min_from(mut self, derive: DeriveBound) -> Self {
        self.min = Bound::Derived(derive);
        self
    }

    pub fn with_max_from(mut self, derive: DeriveBound) -> Self {
        self.max = Bound::Derived(derive);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_value(&self) -> i64 {
        self.initial_value
    }

    pub fn min(&self) -> Bound {
        self.min
    }

    pub fn max(&self) -> Bound {
        self.max
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.name.trim().is_empty() {
            return Err(SequenceError::invalid_field(
                &self.name,
                "field name must not be empty",
            ));
        }

        if let (Some(min), Some(max)) = (self.min.fixed(), self.max.fixed()) {
            if min > max {
                return Err(SequenceError::invalid_field(
                    &self.name,
                    format!("min {min} exceeds max {max}"),
                ));
            }
        }

        if let Some(min) = self.min.fixed() {
            if self.initial_value < min {
                return Err(SequenceError::invalid_field(
                    &self.name,
                    format!("initial value {} is below min {min}", self.initial_value),
                ));
            }
        }

        if let Some(max) = self.max.fixed() {
            if self.initial_value > max {
                return Err(SequenceError::invalid_field(
                    &self.name,
                    format!("initial value {} is above max {max}", self.initial_value),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LockedFields<'a> {
    fields: &'a [FieldState],
}

impl<'a> LockedFields<'a> {
    pub fn new(fields: &'a [FieldState]) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self { fields: &[] }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.fields
            .iter()
            .find(|field| field.name() == name)
            .map(FieldState::current_value)
    }
}

/// A live field. `min <= value <= max` holds for its whole lifetime.
#[derive(Debug, Clone)]
pub struct FieldState {
    spec: FieldSpec,
    min: i64,
    max: i64,
    value: i64,
}

impl FieldState {
    pub fn activate(spec: &FieldSpec, locked: &LockedFields<'_>) -> Self {
        let min = spec.min.resolve(locked);
        let mut max = spec.max.resolve(locked);
        if max < min {
            warn!(
                field = spec.name(),
                min, max, "derived max fell below min; collapsing range to min"
            );
            max = min;
        }
        let value = spec.initial_value.clamp(min, max);
        debug!(field = spec.name(), min, max, value, "field activated");
        Self {
            spec: spec.clone(),
            min,
            max,
            value,
        }
    }

    pub fn increment(&mut self) {
        self.value = self.value.saturating_add(1).min(self.max);
        debug!(field = self.spec.name(), value = self.value, "increment");
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1).max(self.min);
        debug!(field = self.spec.name(), value = self.value, "decrement");
    }

    pub fn current_value(&self) -> i64 {
        self.value
    }

    pub fn instructions(&self) -> &str {
        self.spec.instructions()
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }
}
