use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vectorizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Smallest n-gram length
    #[serde(default = "default_ngram")]
    pub ngram_min: usize,

    /// Largest n-gram length
    #[serde(default = "default_ngram")]
    pub ngram_max: usize,

    /// Minimum number of documents a term must appear in
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Keep only the most frequent terms (unlimited when unset)
    #[serde(default)]
    pub max_features: Option<usize>,

    /// Lowercase text before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Replace term count `tf` with `1 + ln(tf)`
    #[serde(default)]
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            ngram_min: default_ngram(),
            ngram_max: default_ngram(),
            min_df: default_min_df(),
            max_features: None,
            lowercase: true,
            sublinear_tf: false,
        }
    }
}

/// Logistic regression hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Optimizer iteration cap
    pub max_iterations: u64,

    /// L2 penalty strength
    pub alpha: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            alpha: 1.0,
        }
    }
}

/// Behaviour for inputs that share no token with the fitted vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTextPolicy {
    /// Answer with the most frequent training intent
    #[default]
    MajorityClass,

    /// Refuse the input
    Reject,
}

impl std::fmt::Display for UnknownTextPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownTextPolicy::MajorityClass => write!(f, "majority_class"),
            UnknownTextPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Prediction result with confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted intent
    pub intent: String,

    /// Probability of the predicted intent (0.0 - 1.0)
    pub confidence: f64,

    /// All class probabilities
    pub probabilities: BTreeMap<String, f64>,

    /// True when the input had no known token and the fallback answered
    pub fallback: bool,
}

impl Prediction {
    pub fn new(intent: String, confidence: f64) -> Self {
        Self {
            intent,
            confidence,
            probabilities: BTreeMap::new(),
            fallback: false,
        }
    }

    pub fn with_probabilities(mut self, probabilities: BTreeMap<String, f64>) -> Self {
        self.probabilities = probabilities;
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

fn default_ngram() -> usize {
    1
}

fn default_min_df() -> usize {
    1
}

fn default_true() -> bool {
    true
}
