//! Integration test: model registry, lifecycle and evaluation

use ndarray::{array, Array1, Array2};
use tabular_pipeline::preprocessing::{
    ClassLabel, ClassificationMode, FeatureMatrix, LabelVector, PreparedData,
};
use tabular_pipeline::training::{
    Algorithm, AlgorithmFamily, CrossValidator, LearningCurveConfig,
    LearningCurveGenerator, ReportBuilder, Splitter, UntrainedModel,
};
use tabular_pipeline::PipelineError;

fn text_labels(values: &[&str]) -> LabelVector {
    LabelVector::from_labels(values.iter().map(|v| ClassLabel::Text(v.to_string())).collect())
}

/// 40 rows, two features; class is 1 when f1 > f2
fn separable_data() -> (FeatureMatrix, LabelVector) {
    let mut values = Array2::<f64>::zeros((40, 2));
    let mut labels = Vec::with_capacity(40);
    for i in 0..40 {
        let f1 = (i % 8) as f64;
        let f2 = ((i * 3) % 7) as f64 + 0.5;
        values[[i, 0]] = f1;
        values[[i, 1]] = f2;
        labels.push(ClassLabel::Number(if f1 > f2 { 1.0 } else { 0.0 }));
    }
    let features = FeatureMatrix::new(vec!["f1".into(), "f2".into()], values).unwrap();
    (features, LabelVector::from_labels(labels))
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_families() {
    let expected = [
        ("Logistic Regression", AlgorithmFamily::Classifier),
        ("Linear Regression", AlgorithmFamily::Regressor),
        ("Decision Tree", AlgorithmFamily::Classifier),
    ];
    for (name, family) in expected {
        let model = UntrainedModel::from_name(name).unwrap();
        assert_eq!(model.family(), family, "{}", name);
        assert_eq!(model.algorithm().name(), name);
    }
}

#[test]
fn test_registry_rejects_unknown_names() {
    for name in ["Unknown Algo", "logistic regression", "", "Decision Tree "] {
        match UntrainedModel::from_name(name) {
            Err(PipelineError::UnsupportedAlgorithm { supported, .. }) => {
                assert_eq!(supported, Algorithm::supported_names());
            }
            other => panic!("{:?} should be unsupported, got {:?}", name, other.map(|m| m.algorithm())),
        }
    }
}

// ============================================================================
// Model lifecycle
// ============================================================================

#[test]
fn test_trained_model_remembers_feature_count() {
    let (x, y) = separable_data();
    for algorithm in Algorithm::ALL {
        let model = UntrainedModel::new(algorithm).fit(&x, &y).unwrap();
        assert_eq!(model.expected_feature_count(), 2);
        assert_eq!(model.algorithm(), algorithm);
    }
}

#[test]
fn test_predict_rejects_wrong_width() {
    let (x, y) = separable_data();
    let wide = Array2::<f64>::zeros((3, 5));
    let narrow = Array2::<f64>::zeros((3, 1));

    for algorithm in Algorithm::ALL {
        let model = UntrainedModel::new(algorithm).fit(&x, &y).unwrap();
        for input in [&wide, &narrow] {
            match model.predict_array(input) {
                Err(PipelineError::FeatureShapeMismatch { expected, actual }) => {
                    assert_eq!(expected, 2);
                    assert_eq!(actual, input.ncols());
                }
                other => panic!("{}: expected FeatureShapeMismatch, got {:?}", algorithm, other),
            }
        }
    }
}

#[test]
fn test_decision_tree_fits_training_data() {
    let (x, y) = separable_data();
    let model = UntrainedModel::new(Algorithm::DecisionTree).fit(&x, &y).unwrap();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(&predictions, y.codes());
}

#[test]
fn test_logistic_regression_multiclass() {
    let x = FeatureMatrix::new(
        vec!["v".into()],
        array![[0.0], [0.1], [0.2], [5.0], [5.1], [5.2], [10.0], [10.1], [10.2]],
    )
    .unwrap();
    let y = text_labels(&["low", "low", "low", "mid", "mid", "mid", "top", "top", "top"]);

    let model = UntrainedModel::new(Algorithm::LogisticRegression).fit(&x, &y).unwrap();
    let predictions = model.predict(&x).unwrap();
    assert!(predictions.iter().all(|&c| c == 0.0 || c == 1.0 || c == 2.0));
    assert_eq!(predictions[0], 0.0);
    assert_eq!(predictions[8], 2.0);
}

// ============================================================================
// Splitting
// ============================================================================

#[test]
fn test_split_counts() {
    for n in [2usize, 3, 5, 10, 99, 100, 257] {
        for ratio in [0.1, 0.2, 0.25, 0.5, 0.9] {
            let splitter = Splitter::new(ratio).unwrap().with_random_state(0);
            let (train, test) = splitter.split_indices(n).unwrap();
            assert_eq!(train.len() + test.len(), n);

            let expected = ((n as f64 * ratio).round() as usize).clamp(1, n - 1);
            assert_eq!(test.len(), expected, "n={} ratio={}", n, ratio);

            let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
            all.sort_unstable();
            assert_eq!(all, (0..n).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_split_single_row() {
    let splitter = Splitter::new(0.2).unwrap();
    let x = FeatureMatrix::new(vec!["a".into()], array![[1.0]]).unwrap();
    let y = text_labels(&["yes"]);

    assert!(matches!(
        splitter.split(&x, &y),
        Err(PipelineError::InsufficientRows { rows: 1, .. })
    ));
}

#[test]
fn test_split_rejects_bad_ratio() {
    for ratio in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
        assert!(matches!(
            Splitter::new(ratio),
            Err(PipelineError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn test_split_keeps_class_list() {
    let (x, y) = separable_data();
    let split = Splitter::new(0.2).unwrap().with_random_state(9).split(&x, &y).unwrap();
    assert_eq!(split.train.labels.classes(), y.classes());
    assert_eq!(split.test.labels.classes(), y.classes());
    assert_eq!(split.test.n_rows(), 8);
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_perfect_predictions() {
    let y = text_labels(&["cat", "dog", "dog", "cat", "dog"]);
    let report = ReportBuilder::for_labels(&y).build(y.codes(), y.codes()).unwrap();

    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.precision, 1.0);
    assert_eq!(report.f1, 1.0);
    assert_eq!(report.confusion_matrix, vec![vec![2, 0], vec![0, 3]]);
}

#[test]
fn test_binary_positive_class_is_greater_label() {
    let y = text_labels(&["no", "yes", "yes", "no"]);
    assert_eq!(y.mode(), ClassificationMode::Binary { positive: 1 });

    // one true "yes" predicted "no": precision 1, recall 1/2
    let predicted: Array1<f64> = array![0.0, 1.0, 0.0, 0.0];
    let report = ReportBuilder::for_labels(&y).build(y.codes(), &predicted).unwrap();
    assert_eq!(report.accuracy, 0.75);
    assert_eq!(report.precision, 1.0);
    assert!((report.f1 - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_report_rejects_length_mismatch() {
    let y = text_labels(&["a", "b"]);
    let predicted: Array1<f64> = array![0.0];
    assert!(ReportBuilder::for_labels(&y).build(y.codes(), &predicted).is_err());
}

// ============================================================================
// Cross-validation and learning curves
// ============================================================================

#[test]
fn test_kfold_covers_every_row_once() {
    let splits = CrossValidator::new(4, 2)
        .with_random_state(Some(1))
        .split(22)
        .unwrap();
    assert_eq!(splits.len(), 8);

    for repeat in splits.chunks(4) {
        let mut seen: Vec<usize> = repeat.iter().flat_map(|s| s.test_indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..22).collect::<Vec<_>>());
    }
}

#[test]
fn test_learning_curve_generation() {
    let (features, labels) = separable_data();
    let data = PreparedData { features, labels };

    let config = LearningCurveConfig::default().with_train_sizes(vec![0.25, 0.5, 1.0]);
    let curve = LearningCurveGenerator::new(config)
        .with_random_state(Some(3))
        .generate(Algorithm::DecisionTree, &data)
        .unwrap();

    assert_eq!(curve.algorithm, Algorithm::DecisionTree);
    assert_eq!(curve.n_folds, 3);

    let sizes: Vec<usize> = curve.points.iter().map(|p| p.train_size).collect();
    assert_eq!(sizes, vec![6, 13, 26]);
    for point in &curve.points {
        assert!((0.0..=1.0).contains(&point.train.mean_score));
        assert!((0.0..=1.0).contains(&point.validation.mean_score));
    }

    let svg = curve.render_svg();
    assert!(svg.contains("Learning Curve for Decision Tree"));
    assert!(svg.contains("Train"));
    assert!(svg.contains("Test"));
}

#[test]
fn test_learning_curve_rejects_bad_config() {
    let (features, labels) = separable_data();
    let data = PreparedData { features, labels };

    let config = LearningCurveConfig::default().with_n_folds(1);
    let err = LearningCurveGenerator::new(config)
        .generate(Algorithm::DecisionTree, &data)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter { .. }));
}
