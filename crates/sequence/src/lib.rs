pub mod clock;
pub mod controller;
pub mod field;
pub mod result;

pub use controller::{SelectOutcome, SequenceController, DEFAULT_TERMINAL_INSTRUCTIONS};
pub use field::{Bound, DeriveBound, FieldSpec, FieldState, LockedFields};
pub use result::ComposedResult;
pub use shared::error::SequenceError;
