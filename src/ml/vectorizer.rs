use crate::error::{AppError, Result};
use crate::ml::models::VectorizerConfig;
use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Words of two or more word characters; single characters are dropped.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is a valid regex"));

/// TF-IDF vectorizer with a vocabulary frozen at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Configuration
    config: VectorizerConfig,

    /// Vocabulary mapping (term -> column), columns in lexicographic term order
    vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per column
    idf: Vec<f64>,

    /// Is fitted (vocabulary built)
    is_fitted: bool,
}

impl TfidfVectorizer {
    /// Create a new, unfitted vectorizer
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit vocabulary and IDF weights on a corpus
    pub fn fit<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<()> {
        if texts.is_empty() {
            return Err(AppError::Training(
                "Cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }
        if self.config.ngram_max == 0 || self.config.ngram_min > self.config.ngram_max {
            return Err(AppError::Configuration(format!(
                "Invalid vectorizer n-gram range: ngram_min = {}, ngram_max = {}",
                self.config.ngram_min, self.config.ngram_max
            )));
        }

        // Document frequency and corpus frequency per term
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut corpus_freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let terms = self.tokenize(text.as_ref());
            for term in &terms {
                *corpus_freq.entry(term.clone()).or_insert(0) += 1;
            }

            let unique_terms: HashSet<String> = terms.into_iter().collect();
            for term in unique_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let min_df = self.config.min_df;
        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= min_df)
            .collect();

        if let Some(max_features) = self.config.max_features {
            // Most frequent terms first, ties broken by term
            kept.sort_by(|a, b| corpus_freq[&b.0].cmp(&corpus_freq[&a.0]).then(a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }

        if kept.is_empty() {
            return Err(AppError::Training(
                "Empty vocabulary; the corpus has no token of two or more word characters"
                    .to_string(),
            ));
        }

        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = texts.len() as f64;
        self.idf = kept
            .iter()
            .map(|(_, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();
        self.is_fitted = true;

        info!(
            documents = texts.len(),
            vocab_size = self.vocabulary.len(),
            "Fitted TF-IDF vectorizer"
        );

        Ok(())
    }

    /// Transform texts into L2-normalized TF-IDF rows.
    ///
    /// Out-of-vocabulary terms are ignored, so a text with no known term
    /// becomes an all-zero row.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(AppError::NotFitted(
                "TfidfVectorizer must be fitted before transform".to_string(),
            ));
        }

        let mut features = Array2::zeros((texts.len(), self.n_features()));

        for (row, text) in texts.iter().enumerate() {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for term in self.tokenize(text.as_ref()) {
                if let Some(&idx) = self.vocabulary.get(&term) {
                    *counts.entry(idx).or_insert(0) += 1;
                }
            }

            for (&idx, &count) in &counts {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                features[[row, idx]] = tf * self.idf[idx];
            }

            let norm = features.row(row).dot(&features.row(row)).sqrt();
            if norm > 0.0 {
                features.row_mut(row).mapv_inplace(|v| v / norm);
            } else {
                debug!(row, "Text has no known terms");
            }
        }

        Ok(features)
    }

    /// Fit and transform in one step
    pub fn fit_transform<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<Array2<f64>> {
        self.fit(texts)?;
        self.transform(texts)
    }

    /// Split text into terms (n-grams joined by a single space)
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.config.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let words: Vec<&str> = TOKEN_PATTERN.find_iter(&text).map(|m| m.as_str()).collect();

        let mut terms = Vec::new();
        for n in self.config.ngram_min.max(1)..=self.config.ngram_max {
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }

        terms
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check if fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Hex SHA-256 over the vocabulary and IDF weights.
    ///
    /// A classifier records this at training time so it can only be paired
    /// with the vectorizer whose columns it was fitted on.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (term, &idx) in &self.vocabulary {
            hasher.update(term.as_bytes());
            hasher.update([0u8]);
            hasher.update((idx as u64).to_le_bytes());
        }
        for weight in &self.idf {
            hasher.update(weight.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(VectorizerConfig::default())
    }
}
