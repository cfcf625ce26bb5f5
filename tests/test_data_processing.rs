//! Integration tests for data processing: loading, validation and encoding

use polars::prelude::*;
use std::io::Write;
use tabular_pipeline::preprocessing::{
    ClassLabel, ClassificationMode, ColumnEncoding, OneHotEncoder, Preprocessor,
};
use tabular_pipeline::utils::{Dataset, DatasetLoader};
use tabular_pipeline::PipelineError;

const MIXED_CSV: &str = "\
age,city,member,label
31,Paris,true,yes
45,Rome,false,no
27,Paris,true,yes
52,Oslo,false,no
38,Rome,true,yes
";

fn mixed_dataset() -> Dataset {
    DatasetLoader::new().load(MIXED_CSV.as_bytes()).unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(MIXED_CSV.as_bytes()).unwrap();

    let dataset = DatasetLoader::new().load_path(file.path()).unwrap();
    assert_eq!(dataset.n_rows(), 5);
    assert_eq!(dataset.column_names(), vec!["age", "city", "member", "label"]);
}

#[test]
fn test_load_rejects_ragged_rows() {
    let err = DatasetLoader::new()
        .load("a,b,c\n1,2,3\n4,5,6,7\n".as_bytes())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnreadableInput(_)));
}

#[test]
fn test_load_rejects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = DatasetLoader::new()
        .load_path(dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnreadableInput(_)));
}

#[test]
fn test_dataset_from_frame_rejects_nulls() {
    let df = df!(
        "a" => &[Some(1.0), None, Some(3.0)],
        "b" => &[1, 2, 3]
    )
    .unwrap();
    assert!(matches!(
        Dataset::from_frame(df),
        Err(PipelineError::UnreadableInput(_))
    ));
}

#[test]
fn test_target_lookup_is_exact() {
    let dataset = mixed_dataset();
    assert!(dataset.validate_target("label").is_ok());

    for wrong in ["Label", "label ", "lab", ""] {
        let err = dataset.validate_target(wrong).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Provide exact column name"), "{}", message);
        assert!(message.contains("age, city, member, label"), "{}", message);
    }
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_prepare_mixed_columns() {
    let prepared = Preprocessor::new().prepare(&mixed_dataset(), "label").unwrap();

    assert_eq!(
        prepared.features.names(),
        &["age", "city_Oslo", "city_Paris", "city_Rome", "member"]
    );
    assert_eq!(prepared.n_rows(), 5);

    let values = prepared.features.values();
    // row 0: 31, Paris, true
    assert_eq!(values.row(0).to_vec(), vec![31.0, 0.0, 1.0, 0.0, 1.0]);
    // row 3: 52, Oslo, false
    assert_eq!(values.row(3).to_vec(), vec![52.0, 1.0, 0.0, 0.0, 0.0]);

    assert_eq!(
        prepared.labels.classes(),
        &[ClassLabel::Text("no".into()), ClassLabel::Text("yes".into())]
    );
    assert_eq!(prepared.mode(), ClassificationMode::Binary { positive: 1 });
}

#[test]
fn test_encoding_is_deterministic() {
    let dataset = mixed_dataset();
    let first = Preprocessor::new().prepare(&dataset, "label").unwrap();
    let second = Preprocessor::new().prepare(&dataset, "label").unwrap();

    assert_eq!(first.features.names(), second.features.names());
    assert_eq!(first.features.values(), second.features.values());
    assert_eq!(first.labels, second.labels);
}

#[test]
fn test_categorical_target_with_numeric_features() {
    let dataset = DatasetLoader::new()
        .load("w,h,kind\n1,2,b\n3,4,c\n5,6,a\n7,8,d\n".as_bytes())
        .unwrap();
    let prepared = Preprocessor::new().prepare(&dataset, "kind").unwrap();

    assert_eq!(prepared.features.n_features(), 2);
    assert_eq!(prepared.labels.n_classes(), 4);
    assert_eq!(prepared.mode(), ClassificationMode::Multiclass);
    assert_eq!(prepared.labels.codes().to_vec(), vec![1.0, 2.0, 0.0, 3.0]);
}

#[test]
fn test_numeric_target_orders_numerically() {
    let dataset = DatasetLoader::new()
        .load("x,score\n1,10\n2,9\n3,10\n4,9\n".as_bytes())
        .unwrap();
    let prepared = Preprocessor::new().prepare(&dataset, "score").unwrap();

    assert_eq!(
        prepared.labels.classes(),
        &[ClassLabel::Number(9.0), ClassLabel::Number(10.0)]
    );
    assert_eq!(prepared.labels.label(1).map(|l| l.to_string()), Some("10".to_string()));
}

#[test]
fn test_target_only_dataset_has_no_features() {
    let dataset = DatasetLoader::new().load("label\na\nb\n".as_bytes()).unwrap();
    let err = Preprocessor::new().prepare(&dataset, "label").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter { .. }));
}

#[test]
fn test_encoder_ignores_unseen_categories() {
    let train = df!("colour" => &["red", "blue"], "n" => &[1.0, 2.0]).unwrap();
    let other = df!("colour" => &["green", "red"], "n" => &[3.0, 4.0]).unwrap();

    let mut encoder = OneHotEncoder::new();
    encoder.fit(&train).unwrap();
    assert!(matches!(
        &encoder.encodings()[0],
        ColumnEncoding::OneHot { categories, .. } if categories == &["blue", "red"]
    ));

    let matrix = encoder.transform(&other).unwrap();
    assert_eq!(matrix.names(), &["colour_blue", "colour_red", "n"]);
    assert_eq!(matrix.values().row(0).to_vec(), vec![0.0, 0.0, 3.0]);
    assert_eq!(matrix.values().row(1).to_vec(), vec![0.0, 1.0, 4.0]);
}
