use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Per-class evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged precision/recall/F1 over all classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Precision/recall/F1 table in the layout of scikit-learn's `classification_report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
}

impl ClassificationReport {
    /// Compare predictions with ground truth.
    ///
    /// Rows cover every label seen in either sequence, sorted.
    pub fn compute(y_true: &[String], y_pred: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(AppError::Validation(format!(
                "Label count mismatch: {} true labels, {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(AppError::Validation(
                "Cannot evaluate an empty dataset".to_string(),
            ));
        }

        let n_samples = y_true.len();
        let labels: BTreeSet<&String> = y_true.iter().chain(y_pred.iter()).collect();

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        let accuracy = correct as f64 / n_samples as f64;

        let per_class: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let tp = y_true
                    .iter()
                    .zip(y_pred.iter())
                    .filter(|(t, p)| *t == label && *p == label)
                    .count();
                let predicted = y_pred.iter().filter(|p| *p == label).count();
                let support = y_true.iter().filter(|t| *t == label).count();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let n_classes = per_class.len() as f64;
        let macro_avg = AveragedMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n_classes,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n_classes,
            f1_score: per_class.iter().map(|m| m.f1_score).sum::<f64>() / n_classes,
            support: n_samples,
        };

        let weight = |m: &ClassMetrics| m.support as f64 / n_samples as f64;
        let weighted_avg = AveragedMetrics {
            precision: per_class.iter().map(|m| m.precision * weight(m)).sum(),
            recall: per_class.iter().map(|m| m.recall * weight(m)).sum(),
            f1_score: per_class.iter().map(|m| m.f1_score * weight(m)).sum(),
            support: n_samples,
        };

        Ok(Self {
            per_class,
            accuracy,
            macro_avg,
            weighted_avg,
        })
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.per_class.iter().find(|m| m.label == label)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|m| m.label.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        for m in &self.per_class {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1_score, avg.support
            )?;
        }

        Ok(())
    }
}
