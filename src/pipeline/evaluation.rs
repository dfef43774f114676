use crate::config::Config;
use crate::error::Result;
use crate::ml::{load_dataset, ArtifactPaths, ClassificationReport, IntentModel};
use std::path::PathBuf;
use tracing::info;

/// Inputs of an evaluation run
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Labeled JSON corpus to score against
    pub data_path: PathBuf,

    /// Fitted artifacts to evaluate
    pub artifacts: ArtifactPaths,
}

impl EvaluationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_path: config.training.data_path.clone(),
            artifacts: config.artifact_paths(),
        }
    }
}

/// Load persisted artifacts and score them on a labeled dataset
pub fn evaluate(options: &EvaluationOptions) -> Result<ClassificationReport> {
    let model = IntentModel::load(&options.artifacts, Default::default())?;
    let dataset = load_dataset(&options.data_path)?;

    evaluate_model(&model, &dataset.texts, &dataset.labels)
}

/// Score an in-memory model.
///
/// Rows are predicted by the classifier directly; the unknown-text policy
/// only applies to serving.
pub fn evaluate_model(
    model: &IntentModel,
    texts: &[String],
    labels: &[String],
) -> Result<ClassificationReport> {
    let features = model.vectorizer().transform(texts)?;
    let predictions = model.classifier().predict(&features)?;
    let report = ClassificationReport::compute(labels, &predictions)?;

    info!(
        samples = labels.len(),
        accuracy = report.accuracy,
        macro_f1 = report.macro_avg.f1_score,
        "Evaluation completed"
    );

    Ok(report)
}
