//! Intent classification: TF-IDF features, multinomial logistic regression,
//! versioned model artifacts and a single-route prediction API.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod ml;
pub mod pipeline;

pub use error::{AppError, Result};
