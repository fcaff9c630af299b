//! Integration tests for the wdsvm library
//!
//! These tests verify end-to-end functionality across multiple modules
//! and validate real-world usage scenarios.

use approx::assert_relative_eq;
use ndarray::Array2;
use wdsvm::api::{quick, SVM};
use wdsvm::kernel::similarity;
use wdsvm::persistence::{load_model, save_model};
use wdsvm::utils::synthetic::{planted_motif, MotifConfig};
use wdsvm::{
    Alphabet, Dataset, Kernel, KernelMatrix, Label, LabeledSequences, SVMError, SVMModel,
    SVMOptimizer, SequenceStore, WeightedDegreeKernel, WorkingSetStrategy,
};
use std::io::Write;
use tempfile::{Builder, TempDir};

fn motif_data(seed: u64) -> LabeledSequences {
    planted_motif(&MotifConfig {
        n_positive: 30,
        n_negative: 30,
        seed,
        ..MotifConfig::default()
    })
    .expect("Failed to generate data")
}

/// Test complete workflow: data loading -> training -> evaluation
#[test]
fn test_complete_workflow_labeled_file() {
    let mut temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
    motif_data(11)
        .write_to(&mut temp_file)
        .expect("Failed to write");
    temp_file.flush().expect("Failed to flush");

    let model = SVM::with_kernel(WeightedDegreeKernel::new(6).unwrap())
        .with_c(10.0)
        .with_epsilon(0.001)
        .with_max_iterations(10_000)
        .train_from_file(temp_file.path())
        .expect("Training should succeed");

    let accuracy = model
        .evaluate_from_file(temp_file.path())
        .expect("Evaluation should succeed");
    assert!(
        accuracy >= 0.95,
        "Training accuracy should be high on planted-motif data, got: {}",
        accuracy
    );

    let info = model.info();
    assert!(info.n_support_vectors > 0, "Should have support vectors");
    assert!(info.n_support_vectors <= 60);
    assert_eq!(info.sequence_length, 20);

    let dataset = LabeledSequences::from_file(temp_file.path(), Alphabet::Dna).unwrap();
    let metrics = model.evaluate_detailed(&dataset).unwrap();
    assert_eq!(metrics.total(), 60);
    assert!(metrics.precision() >= 0.9);
    assert!(metrics.recall() >= 0.9);
}

#[test]
fn test_generalization_to_held_out_data() {
    let train = motif_data(1);
    let test = motif_data(2);

    for strategy in [
        WorkingSetStrategy::SecondOrder,
        WorkingSetStrategy::SteepestDescent,
    ] {
        let model = SVM::with_kernel(WeightedDegreeKernel::standard(8).unwrap())
            .with_c(10.0)
            .with_working_set_strategy(strategy)
            .train(&train)
            .unwrap();
        let accuracy = model.evaluate(&test).unwrap();
        assert!(
            accuracy >= 0.8,
            "{strategy:?} generalization accuracy too low: {accuracy}"
        );
    }
}

#[test]
fn test_worked_similarity_example() {
    assert_relative_eq!(similarity(b"ACGT", b"ACGA", 2, None).unwrap(), 5.0);
    assert_relative_eq!(similarity(b"ACGT", b"ACGT", 2, None).unwrap(), 7.0);
    assert_relative_eq!(
        similarity(b"ACGT", b"ACGA", 2, Some(&[1.0, 0.5][..])).unwrap(),
        4.0
    );

    assert!(matches!(
        similarity(b"ACGT", b"ACG", 2, None),
        Err(SVMError::LengthMismatch { .. })
    ));
    assert!(matches!(
        similarity(b"ACGT", b"ACGA", 5, None),
        Err(SVMError::DegreeExceedsLength { .. })
    ));
}

#[test]
fn test_kernel_matrix_properties() {
    let data = motif_data(5);
    let kernel = WeightedDegreeKernel::new(4).unwrap();
    let matrix = KernelMatrix::compute(&kernel, data.sequences()).unwrap();

    assert_eq!(matrix.rows(), 60);
    assert!(matrix.is_symmetric(1e-12));
    for i in 0..matrix.rows() {
        assert_relative_eq!(matrix.get(i, i), kernel.self_similarity(20));
        for j in 0..matrix.cols() {
            assert!(matrix.get(i, j) >= 0.0);
            assert!(matrix.get(i, j) <= matrix.get(i, i));
        }
    }

    let normalized = kernel.normalized();
    let seqs = data.sequences();
    for i in 0..5 {
        assert_relative_eq!(normalized.compute(seqs.get(i), seqs.get(i)), 1.0);
    }
}

#[test]
fn test_precomputed_block_diagonal() {
    let n = 10;
    let mut values = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            if (i < n / 2) == (j < n / 2) {
                values[[i, j]] = 1.0;
            }
        }
    }
    let matrix = KernelMatrix::gram(values).unwrap();
    let labels: Vec<Label> = (0..n)
        .map(|i| if i < n / 2 { Label::Positive } else { Label::Negative })
        .collect();

    let model = SVM::new().with_c(10.0).train_precomputed(&matrix, &labels).unwrap();
    assert!(model.converged());
    assert_eq!(model.predict_labels(&matrix).unwrap(), labels);

    let decisions = model.decision_values(&matrix).unwrap();
    for (decision, label) in decisions.iter().zip(&labels) {
        assert_relative_eq!(*decision, label.as_f64(), epsilon = 1e-2);
    }
}

#[test]
fn test_precomputed_dimension_errors() {
    let matrix = KernelMatrix::gram(Array2::eye(3)).unwrap();
    let result = SVM::new().train_precomputed(&matrix, &[Label::Positive, Label::Negative]);
    assert!(matches!(
        result,
        Err(SVMError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));

    let asymmetric = KernelMatrix::from_array(Array2::from_shape_vec(
        (2, 2),
        vec![1.0, 0.5, 0.0, 1.0],
    )
    .unwrap())
    .unwrap();
    assert!(matches!(
        SVM::new().train_precomputed(&asymmetric, &[Label::Positive, Label::Negative]),
        Err(SVMError::InvalidKernelMatrix(_))
    ));

    let model = SVM::new()
        .train_precomputed(&matrix, &[Label::Positive, Label::Negative, Label::Negative])
        .unwrap();
    let wrong_width = KernelMatrix::from_array(Array2::zeros((2, 4))).unwrap();
    assert!(matches!(
        model.predict(&wrong_width),
        Err(SVMError::DimensionMismatch {
            expected: 3,
            actual: 4
        })
    ));
}

/// Random sequences all labeled +1 with a 5-entry custom weighting
#[test]
fn test_single_class_custom_weights() {
    let background = planted_motif(&MotifConfig {
        n_positive: 0,
        n_negative: 100,
        length: 10,
        position: 0,
        ..MotifConfig::default()
    })
    .unwrap();
    let (sequences, labels) = background.into_parts();
    let labels = vec![Label::Positive; labels.len()];

    let kernel = WeightedDegreeKernel::with_weights(vec![0.167, 0.25, 0.5, 0.25, 0.167]).unwrap();
    let model = SVM::with_kernel(kernel)
        .with_c(10.0)
        .train_sequences(&sequences, &labels)
        .unwrap();

    let predictions = model.predict_batch(&sequences).unwrap();
    assert!(predictions.iter().all(|p| p.label == Label::Positive));
    assert_eq!(model.info().n_support_vectors, 0);
}

#[test]
fn test_model_persistence_workflow() {
    let train = motif_data(21);
    let model = SVM::with_kernel(WeightedDegreeKernel::standard(5).unwrap().normalized())
        .with_c(5.0)
        .train(&train)
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let model_path = temp_dir.path().join("model.json");
    save_model(&model, &model_path).unwrap();
    let loaded = load_model(&model_path).unwrap();

    assert_eq!(loaded.info().n_support_vectors, model.info().n_support_vectors);
    assert_eq!(loaded.alphabet(), model.alphabet());

    let test = motif_data(22);
    let original = model.predict_dataset(&test).unwrap();
    let reloaded = loaded.predict_dataset(&test).unwrap();
    for (a, b) in original.iter().zip(reloaded.iter()) {
        assert_eq!(a.label, b.label);
        assert_relative_eq!(a.decision_value, b.decision_value, epsilon = 1e-12);
    }
}

#[test]
fn test_error_handling() {
    // Mismatched labels and sequences
    let store = SequenceStore::new(&["ACGT", "TTTT"], Alphabet::Dna).unwrap();
    let result = SVM::new().train_sequences(&store, &[Label::Positive]);
    assert!(matches!(result, Err(SVMError::DimensionMismatch { .. })));

    // Degree longer than the sequences
    let data = LabeledSequences::from_sequences(
        &["ACG", "TTT"],
        vec![Label::Positive, Label::Negative],
        Alphabet::Dna,
    )
    .unwrap();
    let result = SVM::with_kernel(WeightedDegreeKernel::new(4).unwrap()).train(&data);
    assert!(matches!(
        result,
        Err(SVMError::DegreeExceedsLength {
            degree: 4,
            length: 3
        })
    ));

    // Invalid hyperparameters
    assert!(matches!(
        SVM::new().with_c(-1.0).train(&data),
        Err(SVMError::InvalidParameter(_))
    ));

    // Predicting sequences of the wrong length
    let model = SVM::new().train(&data).unwrap();
    assert!(matches!(
        model.predict("ACGT"),
        Err(SVMError::LengthMismatch { .. })
    ));
    assert!(matches!(
        model.predict("ACN"),
        Err(SVMError::InvalidAlphabet { .. })
    ));
}

#[test]
fn test_quick_helpers() {
    let mut train_file = Builder::new().suffix(".txt").tempfile().unwrap();
    motif_data(31).write_to(&mut train_file).unwrap();
    train_file.flush().unwrap();
    let mut test_file = Builder::new().suffix(".txt").tempfile().unwrap();
    motif_data(32).write_to(&mut test_file).unwrap();
    test_file.flush().unwrap();

    let accuracy = quick::evaluate_split(train_file.path(), test_file.path()).unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let model = quick::train_file_with(train_file.path(), 6, 10.0).unwrap();
    assert!(model.evaluate_from_file(test_file.path()).unwrap() >= 0.8);
}

#[test]
fn test_module_compatibility() {
    let data = motif_data(41);
    let kernel = WeightedDegreeKernel::new(3).unwrap();
    let optimizer = SVMOptimizer::with_kernel(kernel);
    let trained = optimizer.train(&data).unwrap();

    assert_eq!(trained.sequence_length(), data.sequence_length());
    assert_eq!(
        trained.support_vectors().len(),
        trained.support_vector_indices().len()
    );
    for &alpha in trained.alpha_values() {
        assert!(alpha > 0.0 && alpha <= optimizer.config().c + 1e-9);
    }

    let prediction = trained.predict(data.sequences().get(0)).unwrap();
    assert_relative_eq!(
        prediction.decision_value,
        trained.decision_function(data.sequences().get(0)).unwrap()
    );
    assert!(matches!(
        trained.predict(&data.sequences().get(0)[..10]),
        Err(SVMError::LengthMismatch {
            expected: 20,
            actual: 10
        })
    ));
}
