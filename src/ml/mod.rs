/// Machine learning module for intent classification
///
/// This module provides:
/// - Loading labeled `{text, intent}` corpora
/// - TF-IDF feature extraction with a frozen vocabulary
/// - Multinomial logistic regression over the extracted features
/// - Versioned, checksummed persistence of both fitted objects
/// - Precision/recall/F1 evaluation reports
/// - An immutable serving handle combining vectorizer and classifier

pub mod artifact;
pub mod classifier;
pub mod dataset;
pub mod metrics;
pub mod models;
pub mod service;
pub mod vectorizer;

pub use artifact::{
    load_artifact, save_artifact, ArtifactEnvelope, ArtifactKind, ArtifactPaths,
    ARTIFACT_FORMAT_VERSION,
};
pub use classifier::{IntentClassifier, ModelMetadata};
pub use dataset::{load_dataset, Dataset, IntentRecord};
pub use metrics::{AveragedMetrics, ClassMetrics, ClassificationReport};
pub use models::{ClassifierConfig, Prediction, UnknownTextPolicy, VectorizerConfig};
pub use service::IntentModel;
pub use vectorizer::TfidfVectorizer;
