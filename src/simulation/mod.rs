pub mod action;
pub mod episode;

pub use action::{Action, Observation};
pub use episode::{Episode, StepOutcome};
