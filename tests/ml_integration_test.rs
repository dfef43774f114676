/// Integration tests for the training and serving pipeline
///
/// These tests verify:
/// - Training from a JSON corpus on disk
/// - Reloaded artifacts predicting exactly like the in-memory objects
/// - Evaluation reports over saved artifacts
/// - Failure modes when artifacts are missing, damaged or mismatched
mod common;

use intent_classifier::{
    ml::{
        load_artifact, load_dataset, save_artifact, ArtifactKind, ClassifierConfig,
        IntentClassifier, IntentModel, TfidfVectorizer, UnknownTextPolicy, VectorizerConfig,
    },
    pipeline::{evaluate, train, EvaluationOptions},
    AppError,
};
use std::fs;
use tempfile::TempDir;

const SAMPLE_TEXTS: &[&str] = &[
    "book a flight to Paris",
    "cancel my booking",
    "is it going to rain in Berlin",
    "morning flight",
    "hotel",
    "completely unrelated words",
    "",
];

#[test]
fn test_fresh_fit_survives_save_and_load() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("intents.json");
    fs::write(&data_path, common::SUPPORT_CORPUS).unwrap();
    let dataset = load_dataset(&data_path).unwrap();

    let mut vectorizer = TfidfVectorizer::new(VectorizerConfig::default());
    let features = vectorizer.fit_transform(&dataset.texts).unwrap();
    let classifier = IntentClassifier::fit(
        &features,
        &dataset.labels,
        &ClassifierConfig {
            max_iterations: 300,
            alpha: 0.1,
        },
    )
    .unwrap()
    .with_vocabulary_fingerprint(vectorizer.fingerprint());

    let vectorizer_path = dir.path().join("models/vectorizer.bin");
    let classifier_path = dir.path().join("models/intent_model.bin");
    save_artifact(ArtifactKind::Vectorizer, &vectorizer, &vectorizer_path).unwrap();
    save_artifact(ArtifactKind::Classifier, &classifier, &classifier_path).unwrap();

    let loaded_vectorizer: TfidfVectorizer =
        load_artifact(ArtifactKind::Vectorizer, &vectorizer_path).unwrap();
    let loaded_classifier: IntentClassifier =
        load_artifact(ArtifactKind::Classifier, &classifier_path).unwrap();

    let fresh_features = vectorizer.transform(SAMPLE_TEXTS).unwrap();
    let loaded_features = loaded_vectorizer.transform(SAMPLE_TEXTS).unwrap();
    assert_eq!(fresh_features, loaded_features);

    assert_eq!(
        classifier.predict_proba(&fresh_features).unwrap(),
        loaded_classifier.predict_proba(&loaded_features).unwrap()
    );
    assert_eq!(
        classifier.predict(&fresh_features).unwrap(),
        loaded_classifier.predict(&loaded_features).unwrap()
    );
    assert_eq!(
        classifier.vocabulary_fingerprint(),
        loaded_classifier.vocabulary_fingerprint()
    );
    assert_eq!(loaded_vectorizer.fingerprint(), vectorizer.fingerprint());
}

#[test]
fn test_reloaded_artifacts_predict_identically() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::SUPPORT_CORPUS);
    train(&options).unwrap();

    let vectorizer: TfidfVectorizer =
        load_artifact(ArtifactKind::Vectorizer, &options.artifacts.vectorizer).unwrap();
    let classifier: IntentClassifier =
        load_artifact(ArtifactKind::Classifier, &options.artifacts.classifier).unwrap();

    // Save a second copy and compare everything the two copies produce
    let copy_dir = dir.path().join("copy");
    let copy_vectorizer = copy_dir.join("vectorizer.bin");
    let copy_classifier = copy_dir.join("intent_model.bin");
    save_artifact(ArtifactKind::Vectorizer, &vectorizer, &copy_vectorizer).unwrap();
    save_artifact(ArtifactKind::Classifier, &classifier, &copy_classifier).unwrap();

    let reloaded_vectorizer: TfidfVectorizer =
        load_artifact(ArtifactKind::Vectorizer, &copy_vectorizer).unwrap();
    let reloaded_classifier: IntentClassifier =
        load_artifact(ArtifactKind::Classifier, &copy_classifier).unwrap();

    assert_eq!(vectorizer.vocabulary(), reloaded_vectorizer.vocabulary());
    assert_eq!(vectorizer.idf(), reloaded_vectorizer.idf());
    assert_eq!(classifier.classes(), reloaded_classifier.classes());

    let original = vectorizer.transform(SAMPLE_TEXTS).unwrap();
    let reloaded = reloaded_vectorizer.transform(SAMPLE_TEXTS).unwrap();
    assert_eq!(original, reloaded);

    let original_proba = classifier.predict_proba(&original).unwrap();
    let reloaded_proba = reloaded_classifier.predict_proba(&reloaded).unwrap();
    assert_eq!(original_proba, reloaded_proba);
}

#[test]
fn test_trained_model_serves_known_intents() {
    let dir = TempDir::new().unwrap();
    let model = common::trained_model(
        dir.path(),
        common::SUPPORT_CORPUS,
        UnknownTextPolicy::MajorityClass,
    );

    assert_eq!(model.predict_intent("book me a flight").unwrap(), "book_flight");
    assert_eq!(model.predict_intent("please cancel my reservation").unwrap(), "cancel_booking");
    assert_eq!(model.predict_intent("weather forecast today").unwrap(), "weather");
}

#[test]
fn test_probabilities_cover_every_intent() {
    let dir = TempDir::new().unwrap();
    let model = common::trained_model(
        dir.path(),
        common::SUPPORT_CORPUS,
        UnknownTextPolicy::MajorityClass,
    );

    let prediction = model.predict("will it rain in Paris").unwrap();

    assert_eq!(prediction.probabilities.len(), 3);
    let total: f64 = prediction.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(prediction.probabilities[&prediction.intent], prediction.confidence);
    assert!(!prediction.fallback);
}

#[test]
fn test_unknown_text_uses_majority_intent() {
    let dir = TempDir::new().unwrap();
    let model = common::trained_model(
        dir.path(),
        common::SUPPORT_CORPUS,
        UnknownTextPolicy::MajorityClass,
    );

    let prediction = model.predict("xylophone quartz").unwrap();

    // book_flight and weather both have four records; the tie goes to the first sorted name
    assert_eq!(prediction.intent, "book_flight");
    assert!(prediction.fallback);
    assert!((prediction.confidence - 4.0 / 11.0).abs() < 1e-9);
}

#[test]
fn test_evaluation_over_training_corpus() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::SUPPORT_CORPUS);
    let summary = train(&options).unwrap();

    let report = evaluate(&EvaluationOptions {
        data_path: options.data_path.clone(),
        artifacts: options.artifacts.clone(),
    })
    .unwrap();

    assert_eq!(report.accuracy, summary.training_accuracy);
    assert_eq!(report.per_class.len(), 3);
    assert_eq!(report.macro_avg.support, 11);
    assert_eq!(report.class("weather").unwrap().support, 4);

    let rendered = report.to_string();
    assert!(rendered.contains("cancel_booking"));
    assert!(rendered.contains("weighted avg"));
}

#[test]
fn test_evaluation_with_unseen_intent() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::GREETING_CORPUS);
    train(&options).unwrap();

    let eval_path = dir.path().join("eval.json");
    fs::write(
        &eval_path,
        r#"[
            {"text": "hello", "intent": "greet"},
            {"text": "bye", "intent": "farewell"},
            {"text": "order a pizza", "intent": "order_food"}
        ]"#,
    )
    .unwrap();

    let report = evaluate(&EvaluationOptions {
        data_path: eval_path,
        artifacts: options.artifacts.clone(),
    })
    .unwrap();

    let unseen = report.class("order_food").unwrap();
    assert_eq!(unseen.support, 1);
    assert_eq!(unseen.recall, 0.0);
    assert!(report.accuracy < 1.0);
}

#[test]
fn test_missing_artifacts_fail_to_load() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::GREETING_CORPUS);

    let err = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap_err();
    assert!(matches!(err, AppError::Artifact(_)));
}

#[test]
fn test_damaged_artifact_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::GREETING_CORPUS);
    train(&options).unwrap();

    let mut bytes = fs::read(&options.artifacts.classifier).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    fs::write(&options.artifacts.classifier, bytes).unwrap();

    let err = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap_err();
    assert!(matches!(err, AppError::Artifact(_)));
}

#[test]
fn test_mismatched_artifacts_fail_to_load() {
    let first = TempDir::new().unwrap();
    let first_options = common::training_options(first.path(), common::GREETING_CORPUS);
    train(&first_options).unwrap();

    let second = TempDir::new().unwrap();
    let second_options = common::training_options(second.path(), common::SUPPORT_CORPUS);
    train(&second_options).unwrap();

    // Vectorizer from one run, classifier from another
    fs::copy(&second_options.artifacts.vectorizer, &first_options.artifacts.vectorizer).unwrap();

    let err = IntentModel::load(&first_options.artifacts, UnknownTextPolicy::MajorityClass)
        .unwrap_err();
    assert!(matches!(err, AppError::DimensionMismatch { .. }));
}

#[test]
fn test_retraining_replaces_artifacts() {
    let dir = TempDir::new().unwrap();
    let mut options = common::training_options(dir.path(), common::GREETING_CORPUS);
    train(&options).unwrap();

    let support_path = dir.path().join("support.json");
    fs::write(&support_path, common::SUPPORT_CORPUS).unwrap();
    options.data_path = support_path;
    train(&options).unwrap();

    let model = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap();
    assert_eq!(model.classifier().classes().len(), 3);
}

#[test]
fn test_half_finished_retrain_is_not_served() {
    let dir = TempDir::new().unwrap();
    let mut options = common::training_options(
        dir.path(),
        r#"[{"text": "hello", "intent": "greet"}, {"text": "bye", "intent": "farewell"}]"#,
    );
    train(&options).unwrap();

    // Block the classifier write so only the new vectorizer lands
    let blocked = dir.path().join("models/.intent_model.bin.tmp");
    fs::create_dir(&blocked).unwrap();

    let fruit_path = dir.path().join("fruit.json");
    fs::write(
        &fruit_path,
        r#"[{"text": "apple", "intent": "fruit"}, {"text": "carrot", "intent": "vegetable"}]"#,
    )
    .unwrap();
    options.data_path = fruit_path;

    let err = train(&options).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));

    // Same feature width on both sides; only the fingerprint tells them apart
    let err = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap_err();
    assert!(matches!(err, AppError::Artifact(_)));

    fs::remove_dir(&blocked).unwrap();
    train(&options).unwrap();
    let model = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap();
    assert_eq!(model.predict_intent("apple").unwrap(), "fruit");
}

#[test]
fn test_unbound_classifier_artifact_is_rejected() {
    let dir = TempDir::new().unwrap();
    let options = common::training_options(dir.path(), common::GREETING_CORPUS);
    train(&options).unwrap();

    let vectorizer: TfidfVectorizer =
        load_artifact(ArtifactKind::Vectorizer, &options.artifacts.vectorizer).unwrap();
    let features = vectorizer
        .transform(&["hello", "bye", "hi friend", "see you later"])
        .unwrap();
    let labels: Vec<String> = ["greet", "farewell", "greet", "farewell"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let unbound = IntentClassifier::fit(&features, &labels, &options.classifier).unwrap();
    save_artifact(ArtifactKind::Classifier, &unbound, &options.artifacts.classifier).unwrap();

    let err = IntentModel::load(&options.artifacts, UnknownTextPolicy::MajorityClass).unwrap_err();
    assert!(matches!(err, AppError::Artifact(_)));
}
