use crate::error::{AppError, Result};
use crate::ml::metrics::ClassificationReport;
use crate::ml::models::{ClassifierConfig, Prediction};
use linfa::prelude::*;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Hyperparameters used at fit time
    pub hyperparameters: ClassifierConfig,

    /// Accuracy on the training set
    pub training_accuracy: f64,
}

/// Multinomial logistic regression over TF-IDF features.
///
/// Holds only the learned coefficients so the fitted state can be
/// persisted independently of the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassifier {
    /// Class labels, column order of `weights`
    classes: Vec<String>,

    /// Coefficients (n_features × n_classes)
    weights: Array2<f64>,

    /// Per-class intercepts
    intercept: Array1<f64>,

    /// Training examples per class, aligned with `classes`
    class_counts: Vec<usize>,

    /// Index of the most frequent training class
    majority_class: usize,

    /// Fingerprint of the vectorizer whose columns `weights` rows follow
    vocabulary_fingerprint: Option<String>,

    /// Model metadata
    metadata: ModelMetadata,
}

impl IntentClassifier {
    /// Train on a feature matrix and one intent per row
    pub fn fit(
        features: &Array2<f64>,
        labels: &[String],
        config: &ClassifierConfig,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(AppError::Training(format!(
                "Feature rows ({}) and labels ({}) differ in length",
                features.nrows(),
                labels.len()
            )));
        }

        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        for label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        if counts.len() < 2 {
            return Err(AppError::Training(format!(
                "Logistic regression needs at least 2 distinct intents, got {}",
                counts.len()
            )));
        }

        debug!(
            max_iterations = config.max_iterations,
            alpha = config.alpha,
            "Fitting multinomial logistic regression"
        );

        let targets = Array1::from_vec(labels.to_vec());
        let dataset = Dataset::new(features.clone(), targets);

        let model = MultiLogisticRegression::<f64>::default()
            .max_iterations(config.max_iterations)
            .alpha(config.alpha)
            .with_intercept(true)
            .fit(&dataset)
            .map_err(|e| {
                AppError::Training(format!("Failed to train logistic regression: {}", e))
            })?;

        let classes: Vec<String> = model.classes().to_vec();
        let class_counts: Vec<usize> = classes
            .iter()
            .map(|class| counts.get(class).copied().unwrap_or(0))
            .collect();

        // Ties resolve to the first class in sorted order
        let majority_label = counts
            .iter()
            .fold(None::<(&String, usize)>, |best, (label, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((*label, count)),
            })
            .map(|(label, _)| label.clone())
            .unwrap_or_default();
        let majority_class = classes
            .iter()
            .position(|class| *class == majority_label)
            .unwrap_or(0);

        let mut classifier = Self {
            classes,
            weights: model.params().clone(),
            intercept: model.intercept().clone(),
            class_counts,
            majority_class,
            vocabulary_fingerprint: None,
            metadata: ModelMetadata {
                trained_at: chrono::Utc::now(),
                n_training_samples: labels.len(),
                hyperparameters: config.clone(),
                training_accuracy: 0.0,
            },
        };

        let predictions = classifier.predict(features)?;
        let report = ClassificationReport::compute(labels, &predictions)?;
        classifier.metadata.training_accuracy = report.accuracy;

        info!(
            samples = labels.len(),
            features = classifier.n_features(),
            classes = classifier.classes.len(),
            accuracy = report.accuracy,
            "Trained intent classifier"
        );

        Ok(classifier)
    }

    /// Record which vectorizer produced the training features
    pub fn with_vocabulary_fingerprint(mut self, fingerprint: String) -> Self {
        self.vocabulary_fingerprint = Some(fingerprint);
        self
    }

    /// Linear scores `X · W + b`, one column per class
    pub fn decision_function(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(AppError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.ncols(),
            });
        }

        Ok(features.dot(&self.weights) + &self.intercept)
    }

    /// Softmax probabilities, one column per class
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let mut scores = self.decision_function(features)?;

        for mut row in scores.axis_iter_mut(Axis(0)) {
            let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }

        Ok(scores)
    }

    /// Predict one intent per row
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        let scores = self.decision_function(features)?;

        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| self.classes[argmax(row)].clone())
            .collect())
    }

    /// Predict a single feature vector with its class probabilities
    pub fn predict_one(&self, features: ArrayView1<f64>) -> Result<Prediction> {
        let row = features.insert_axis(Axis(0)).to_owned();
        let proba = self.predict_proba(&row)?;
        let proba = proba.row(0);

        let best = argmax(proba);
        let probabilities: BTreeMap<String, f64> = self
            .classes
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();

        Ok(Prediction::new(self.classes[best].clone(), proba[best])
            .with_probabilities(probabilities))
    }

    /// Most frequent intent in the training data
    pub fn majority_class(&self) -> &str {
        &self.classes[self.majority_class]
    }

    /// Training share of the majority class
    pub fn majority_prior(&self) -> f64 {
        let total: usize = self.class_counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        self.class_counts[self.majority_class] as f64 / total as f64
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_counts(&self) -> &[usize] {
        &self.class_counts
    }

    pub fn vocabulary_fingerprint(&self) -> Option<&str> {
        self.vocabulary_fingerprint.as_deref()
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.weights.nrows()
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn argmax(row: ArrayView1<f64>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_value), (idx, &value)| {
            if value > best_value {
                (idx, value)
            } else {
                (best, best_value)
            }
        })
        .0
}
