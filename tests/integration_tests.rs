//! Integration tests for the kmethods library
//!
//! End-to-end workflows across data loading, fitting, evaluation and model
//! selection.

use kmethods::kernel::{Kernel, LinearKernel, RBFKernel};
use kmethods::validation::KernelFamily;
use kmethods::{
    build_method, cross_validate, Dataset, KFold, KMethodError, KernelKNN,
    KernelLogisticRegression, KernelMethod, KernelSVM, KernelSpec, KnnConfig, LogisticConfig,
    MethodConfig, MethodKind, ParamDistribution, RandomSearch, SearchSpace, SvmConfig, VotingClassifier,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use tempfile::NamedTempFile;

/// Two Gaussian blobs centred at (-2, -2) and (2, 2), 40 points each
fn two_blobs(seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (center, label) in [(-2.0, -1.0), (2.0, 1.0)] {
        for _ in 0..40 {
            features.push(vec![
                center + noise.sample(&mut rng),
                center + noise.sample(&mut rng),
            ]);
            labels.push(label);
        }
    }
    Dataset::new(features, labels).unwrap().with_name("blobs")
}

fn blob_klr() -> KernelLogisticRegression {
    KernelLogisticRegression::new(
        LogisticConfig::default()
            .with_kernel(KernelSpec::Rbf { gamma: 0.5 })
            .with_lambda(0.1),
    )
    .unwrap()
}

#[test]
fn test_klr_end_to_end_on_blobs() {
    let data = two_blobs(11);
    let mut klr = blob_klr();
    let summary = klr.fit(&data).unwrap();

    assert!(summary.status.is_converged());
    assert!(summary.iterations <= 100);

    let accuracy = klr.score(&data).unwrap();
    assert!(accuracy >= 0.95, "training accuracy {accuracy}");

    let (recall, precision) = klr.recall_and_precision(&data).unwrap();
    assert!(recall >= 0.9 && precision >= 0.9);

    let deltas = &klr.irls_outcome().unwrap().deltas;
    assert!(*deltas.last().unwrap() <= 1e-5);
}

#[test]
fn test_prediction_is_deterministic() {
    let data = two_blobs(2);
    let mut klr = blob_klr();
    klr.fit(&data).unwrap();

    let x = [0.3, -0.1];
    let first = klr.predict(&x).unwrap();
    let second = klr.predict(&x).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());

    let batch = klr.predict_array(data.features()).unwrap();
    assert_eq!(batch.len(), data.len());
    for (p, row) in batch.iter().zip(data.features()) {
        assert_eq!(p.decision_value, klr.predict(row).unwrap());
    }
}

#[test]
fn test_refit_replaces_previous_model() {
    let mut klr = blob_klr();
    klr.fit(&two_blobs(1)).unwrap();
    let first = klr.alpha().unwrap().to_vec();

    let smaller = two_blobs(2).select(&(0..60).collect::<Vec<_>>());
    klr.fit(&smaller).unwrap();
    assert_eq!(klr.alpha().unwrap().len(), 60);
    assert_ne!(klr.alpha().unwrap(), &first[..60]);
}

#[test]
fn test_untrained_models_refuse_to_predict() {
    let methods: Vec<Box<dyn KernelMethod>> = vec![
        Box::new(blob_klr()),
        Box::new(KernelSVM::new(SvmConfig::default()).unwrap()),
        Box::new(KernelKNN::new(KnnConfig::default()).unwrap()),
    ];
    for method in &methods {
        assert!(!method.is_fitted());
        assert!(matches!(
            method.predict(&[0.0, 0.0]),
            Err(KMethodError::ModelNotTrained)
        ));
        assert!(matches!(
            method.score(&two_blobs(0)),
            Err(KMethodError::ModelNotTrained)
        ));
    }
}

#[test]
fn test_wrong_input_dimension() {
    let mut klr = blob_klr();
    klr.fit(&two_blobs(4)).unwrap();
    assert!(matches!(
        klr.predict(&[1.0, 2.0, 3.0]),
        Err(KMethodError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn test_every_method_learns_the_blobs() {
    let data = two_blobs(8);
    let (train, validation) = {
        let mut shuffled = data.clone();
        shuffled.shuffle(3);
        shuffled.split(0.25).unwrap()
    };
    assert_eq!(validation.len(), 20);

    let configs = [
        MethodConfig::Klr(
            LogisticConfig::default()
                .with_kernel(KernelSpec::Rbf { gamma: 0.5 })
                .with_lambda(0.1),
        ),
        MethodConfig::Svm(SvmConfig::default().with_kernel(KernelSpec::Linear)),
        MethodConfig::Knn(KnnConfig::default()),
    ];
    for config in &configs {
        let mut model = build_method(config).unwrap();
        model.fit(&train).unwrap();
        let accuracy = model.score(&validation).unwrap();
        assert!(accuracy >= 0.85, "{config}: validation accuracy {accuracy}");
    }
}

#[test]
fn test_csv_workflow_with_zero_one_labels() {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    writeln!(file, "x1,x2,label").unwrap();
    for (i, row) in two_blobs(5).features().iter().enumerate() {
        let label = if i < 40 { 0 } else { 1 };
        writeln!(file, "{},{},{}", row[0], row[1], label).unwrap();
    }
    file.flush().unwrap();

    let data = Dataset::from_csv_file(file.path()).unwrap();
    assert_eq!(data.len(), 80);
    assert_eq!(data.dim(), 2);
    assert!(data.labels().iter().any(|&y| y == 0.0));

    let mut klr = blob_klr();
    klr.fit(&data).unwrap();
    // evaluation accepts the {0, 1} encoding of the file
    assert!(klr.score(&data).unwrap() >= 0.95);
}

#[test]
fn test_gram_matrix_properties() {
    let data = two_blobs(9);
    for gram in [
        RBFKernel::new(0.5).gram(data.features()),
        LinearKernel::new().gram(data.features()),
    ] {
        assert_eq!(gram.nrows(), 80);
        assert_eq!(gram, gram.transpose());
        let min_eigenvalue = gram
            .symmetric_eigenvalues()
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        assert!(min_eigenvalue >= -1e-8, "min eigenvalue {min_eigenvalue}");
    }
}

#[test]
fn test_cross_validation_report() {
    let config = MethodConfig::Klr(
        LogisticConfig::default()
            .with_kernel(KernelSpec::Rbf { gamma: 0.5 })
            .with_lambda(0.1),
    );
    let kfold = KFold::new(5).unwrap().with_shuffle(1);
    let report = cross_validate(&config, &two_blobs(6), &kfold).unwrap();

    assert_eq!(report.n_folds(), 5);
    assert!(report.mean_accuracy() >= 0.9);
    assert_eq!(report.accuracy.defined_folds, 5);
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"folds\""));
}

#[test]
fn test_random_search_finds_good_configuration() {
    let mut space = SearchSpace::new(MethodKind::Klr, KernelFamily::Rbf);
    space.gamma = ParamDistribution::LogUniform {
        low: 0.05,
        high: 1.0,
    };
    space.lambda = ParamDistribution::LogUniform {
        low: 0.01,
        high: 1.0,
    };
    let mut search = RandomSearch::new(space, 3, 7).unwrap().with_folds(3);
    search.run(&two_blobs(12)).unwrap();

    assert!(!search.results().is_empty());
    let best = search.best().unwrap();
    assert!(best.report.mean_accuracy() >= 0.9);
}

#[test]
fn test_voting_over_fitted_members() {
    let data = two_blobs(13);
    let mut members: Vec<Box<dyn KernelMethod>> = Vec::new();
    for config in [
        MethodConfig::Klr(LogisticConfig::default().with_kernel(KernelSpec::Linear)),
        MethodConfig::Knn(KnnConfig::default()),
        MethodConfig::Svm(SvmConfig::default().with_kernel(KernelSpec::Linear)),
    ] {
        members.push(build_method(&config).unwrap());
    }

    let mut ensemble = VotingClassifier::new(members, Some(vec![0.5, 0.25, 0.25]), true).unwrap();
    ensemble.fit(&data).unwrap();
    assert!(ensemble.is_fitted());
    assert!(ensemble.score(&data).unwrap() >= 0.95);
}
