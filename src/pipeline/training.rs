use crate::config::Config;
use crate::error::Result;
use crate::ml::{
    load_dataset, save_artifact, ArtifactKind, ArtifactPaths, ClassifierConfig, IntentClassifier,
    TfidfVectorizer, VectorizerConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Inputs of a training run
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// JSON corpus of `{text, intent}` records
    pub data_path: PathBuf,

    /// Where to write the fitted artifacts
    pub artifacts: ArtifactPaths,

    pub vectorizer: VectorizerConfig,

    pub classifier: ClassifierConfig,
}

impl TrainingOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_path: config.training.data_path.clone(),
            artifacts: config.artifact_paths(),
            vectorizer: config.vectorizer.clone(),
            classifier: config.classifier_config(),
        }
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub n_samples: usize,
    pub n_features: usize,
    pub intents: Vec<String>,
    pub training_accuracy: f64,
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
}

/// Load corpus, fit vectorizer and classifier, persist both.
///
/// The vectorizer artifact is written before the classifier one; each write
/// is atomic, but a failure between the two leaves the previous classifier
/// next to the new vectorizer.
pub fn train(options: &TrainingOptions) -> Result<TrainingSummary> {
    info!(
        data = %options.data_path.display(),
        max_iterations = options.classifier.max_iterations,
        "Starting training run"
    );

    let dataset = load_dataset(&options.data_path)?;

    let mut vectorizer = TfidfVectorizer::new(options.vectorizer.clone());
    let features = vectorizer.fit_transform(&dataset.texts)?;

    let classifier = IntentClassifier::fit(&features, &dataset.labels, &options.classifier)?
        .with_vocabulary_fingerprint(vectorizer.fingerprint());

    save_artifact(ArtifactKind::Vectorizer, &vectorizer, &options.artifacts.vectorizer)?;
    save_artifact(ArtifactKind::Classifier, &classifier, &options.artifacts.classifier)?;

    let summary = TrainingSummary {
        n_samples: dataset.len(),
        n_features: vectorizer.n_features(),
        intents: classifier.classes().to_vec(),
        training_accuracy: classifier.metadata().training_accuracy,
        vectorizer_path: options.artifacts.vectorizer.clone(),
        classifier_path: options.artifacts.classifier.clone(),
    };

    info!(
        samples = summary.n_samples,
        features = summary.n_features,
        intents = summary.intents.len(),
        accuracy = summary.training_accuracy,
        "Model and vectorizer trained and saved"
    );

    Ok(summary)
}
