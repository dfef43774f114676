use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// One labeled utterance from the training corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    pub text: String,
    pub intent: String,
}

/// Texts and intents as aligned columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub texts: Vec<String>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn from_records(records: Vec<IntentRecord>) -> Self {
        let (texts, labels) = records
            .into_iter()
            .map(|record| (record.text, record.intent))
            .unzip();
        Self { texts, labels }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Distinct intents in sorted order
    pub fn intents(&self) -> Vec<String> {
        self.labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Read a JSON array of `{text, intent}` records.
///
/// A record missing either key fails the whole load; nothing is skipped.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| AppError::Dataset(format!("Failed to open {}: {}", path.display(), e)))?;

    let records: Vec<IntentRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::Dataset(format!("Failed to parse {}: {}", path.display(), e)))?;

    let dataset = Dataset::from_records(records);
    info!(
        path = %path.display(),
        records = dataset.len(),
        intents = dataset.intents().len(),
        "Loaded dataset"
    );

    Ok(dataset)
}
