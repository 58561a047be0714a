//! Quiz rules: the round state machine, answer scoring and player views.

pub mod controller;
pub mod scoring;
pub mod view;

pub use controller::{advance, retreat, QuestionLayout};
pub use scoring::auto_score;
