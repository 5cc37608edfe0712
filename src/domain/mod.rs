//! Domain layer: content records, change events, apply outcomes, and
//! path normalization.

pub mod change_event;
pub mod content;
pub mod outcome;
pub mod path;

pub use change_event::ChangeEvent;
pub use content::{ContentRecord, ContentSummary};
pub use outcome::{ApplyOutcome, OutcomeBus};
