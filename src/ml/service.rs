use crate::error::{AppError, Result};
use crate::ml::artifact::{load_artifact, ArtifactKind, ArtifactPaths};
use crate::ml::classifier::IntentClassifier;
use crate::ml::models::{Prediction, UnknownTextPolicy};
use crate::ml::vectorizer::TfidfVectorizer;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Fitted vectorizer and classifier, immutable once built.
///
/// Shared across request handlers behind an `Arc`; every method takes
/// `&self` so no locking is needed.
#[derive(Debug, Clone)]
pub struct IntentModel {
    vectorizer: TfidfVectorizer,
    classifier: IntentClassifier,
    policy: UnknownTextPolicy,
}

impl IntentModel {
    /// Assemble a model from in-memory parts
    pub fn from_parts(
        vectorizer: TfidfVectorizer,
        classifier: IntentClassifier,
        policy: UnknownTextPolicy,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(AppError::NotFitted(
                "Vectorizer must be fitted before serving".to_string(),
            ));
        }
        if vectorizer.n_features() != classifier.n_features() {
            return Err(AppError::DimensionMismatch {
                expected: classifier.n_features(),
                actual: vectorizer.n_features(),
            });
        }
        if let Some(expected) = classifier.vocabulary_fingerprint() {
            let actual = vectorizer.fingerprint();
            if expected != actual {
                return Err(AppError::Artifact(format!(
                    "Classifier was trained against vectorizer {}, found vectorizer {}; \
                     artifacts come from different training runs",
                    short_fingerprint(expected),
                    short_fingerprint(&actual)
                )));
            }
        }

        Ok(Self {
            vectorizer,
            classifier,
            policy,
        })
    }

    /// Load both artifacts from disk
    pub fn load(paths: &ArtifactPaths, policy: UnknownTextPolicy) -> Result<Self> {
        let vectorizer: TfidfVectorizer = load_artifact(ArtifactKind::Vectorizer, &paths.vectorizer)?;
        let classifier: IntentClassifier = load_artifact(ArtifactKind::Classifier, &paths.classifier)?;

        if classifier.vocabulary_fingerprint().is_none() {
            return Err(AppError::Artifact(format!(
                "Classifier artifact {} does not record its vectorizer",
                paths.classifier.display()
            )));
        }

        let model = Self::from_parts(vectorizer, classifier, policy)?;
        info!(
            vocab_size = model.vectorizer.vocab_size(),
            intents = model.classifier.classes().len(),
            policy = %policy,
            "Intent model ready"
        );

        Ok(model)
    }

    /// Predict the intent of one text
    pub fn predict_intent(&self, text: &str) -> Result<String> {
        self.predict(text).map(|prediction| prediction.intent)
    }

    /// Predict the intent of one text with class probabilities
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let features = self.vectorizer.transform(&[text])?;
        let row = features.row(0);

        if row.iter().all(|&v| v == 0.0) {
            return self.unknown_text(text);
        }

        let prediction = self.classifier.predict_one(row)?;
        debug!(
            intent = %prediction.intent,
            confidence = prediction.confidence,
            "Predicted intent"
        );

        Ok(prediction)
    }

    fn unknown_text(&self, text: &str) -> Result<Prediction> {
        match self.policy {
            UnknownTextPolicy::MajorityClass => {
                let intent = self.classifier.majority_class().to_string();
                debug!(intent = %intent, "No known terms, using majority intent");

                let total: usize = self.classifier.class_counts().iter().sum();
                let priors: BTreeMap<String, f64> = self
                    .classifier
                    .classes()
                    .iter()
                    .cloned()
                    .zip(
                        self.classifier
                            .class_counts()
                            .iter()
                            .map(|&count| count as f64 / total.max(1) as f64),
                    )
                    .collect();

                Ok(Prediction::new(intent, self.classifier.majority_prior())
                    .with_probabilities(priors)
                    .as_fallback())
            }
            UnknownTextPolicy::Reject => Err(AppError::UnknownText(format!(
                "no term of {:?} is in the vocabulary",
                truncate(text, 64)
            ))),
        }
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn policy(&self) -> UnknownTextPolicy {
        self.policy
    }
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
