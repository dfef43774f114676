//! Common test utilities for training throwaway models

#![allow(dead_code)]

use intent_classifier::{
    ml::{ArtifactPaths, ClassifierConfig, IntentModel, UnknownTextPolicy, VectorizerConfig},
    pipeline::{train, TrainingOptions},
};
use std::fs;
use std::path::Path;

/// Two-intent corpus where every text is separable by a single word
pub const GREETING_CORPUS: &str = r#"[
    {"text": "hello", "intent": "greet"},
    {"text": "hello there", "intent": "greet"},
    {"text": "hi friend", "intent": "greet"},
    {"text": "good morning", "intent": "greet"},
    {"text": "bye", "intent": "farewell"},
    {"text": "goodbye", "intent": "farewell"},
    {"text": "see you later", "intent": "farewell"}
]"#;

/// Three intents with shared vocabulary, for round-trip checks on probabilities
pub const SUPPORT_CORPUS: &str = r#"[
    {"text": "I want to book a flight to Paris", "intent": "book_flight"},
    {"text": "book me a flight for tomorrow", "intent": "book_flight"},
    {"text": "find a cheap flight to Berlin", "intent": "book_flight"},
    {"text": "reserve a seat on the morning flight", "intent": "book_flight"},
    {"text": "cancel my flight booking", "intent": "cancel_booking"},
    {"text": "I need to cancel my reservation", "intent": "cancel_booking"},
    {"text": "please cancel the hotel booking", "intent": "cancel_booking"},
    {"text": "what is the weather in Paris", "intent": "weather"},
    {"text": "will it rain tomorrow", "intent": "weather"},
    {"text": "is it sunny in Berlin today", "intent": "weather"},
    {"text": "weather forecast for the morning", "intent": "weather"}
]"#;

/// Write `corpus` under `dir` and return options that train into `dir/models`
pub fn training_options(dir: &Path, corpus: &str) -> TrainingOptions {
    let data_path = dir.join("intents.json");
    fs::write(&data_path, corpus).unwrap();

    TrainingOptions {
        data_path,
        artifacts: ArtifactPaths::in_dir(dir.join("models")),
        vectorizer: VectorizerConfig::default(),
        // Weak regularization so tiny corpora are fit exactly
        classifier: ClassifierConfig {
            max_iterations: 300,
            alpha: 0.1,
        },
    }
}

/// Train on `corpus` and load the saved artifacts back
pub fn trained_model(dir: &Path, corpus: &str, policy: UnknownTextPolicy) -> IntentModel {
    let options = training_options(dir, corpus);
    train(&options).unwrap();
    IntentModel::load(&options.artifacts, policy).unwrap()
}
