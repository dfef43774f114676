//! Offline routines: training a model from a corpus and scoring it.

pub mod evaluation;
pub mod training;

pub use evaluation::{evaluate, evaluate_model, EvaluationOptions};
pub use training::{train, TrainingOptions, TrainingSummary};
