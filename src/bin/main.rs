//! wdsvm Command Line Interface
//!
//! A command-line interface for training, evaluating, and using
//! weighted-degree string kernel SVM models on labeled sequence and FASTA files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use wdsvm::api::SVM;
use wdsvm::core::{Result, SVMError, WorkingSetStrategy};
use wdsvm::data::{load_sequences, LabeledSequences};
use wdsvm::features::{Alphabet, SequenceStore};
use wdsvm::kernel::{WeightedDegreeKernel, DEFAULT_DEGREE};
use wdsvm::persistence::SerializableModel;
use wdsvm::utils::synthetic::{planted_motif, MotifConfig};
use wdsvm::utils::validation;
use wdsvm::{Dataset, Label};

#[derive(Parser)]
#[command(name = "wdsvm")]
#[command(about = "Weighted-degree string kernel SVM for biological sequences")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "wdsvm contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Print the kernel value of two sequences
    Similarity(SimilarityArgs),
    /// Train and classify a synthetic planted-motif dataset
    Demo(DemoArgs),
}

/// Kernel options shared by several commands
#[derive(Args, Clone)]
struct KernelArgs {
    /// Maximum k-mer length (defaults to the number of weights, or 3)
    #[arg(long)]
    degree: Option<usize>,

    /// Comma-separated per-degree weights, e.g. 0.167,0.25,0.5,0.25,0.167
    #[arg(long, value_delimiter = ',', conflicts_with = "standard_weights")]
    weights: Option<Vec<f64>>,

    /// Use decreasing weights 2(D-k+1)/(D(D+1)) instead of uniform ones
    #[arg(long)]
    standard_weights: bool,

    /// Normalize kernel values to unit self-similarity
    #[arg(long)]
    normalize: bool,
}

impl KernelArgs {
    fn build(&self) -> Result<WeightedDegreeKernel> {
        let kernel = match &self.weights {
            Some(weights) => {
                if let Some(degree) = self.degree {
                    if degree != weights.len() {
                        return Err(SVMError::InvalidParameter(format!(
                            "Expected {} weights for degree {}, got {}",
                            degree,
                            degree,
                            weights.len()
                        )));
                    }
                }
                WeightedDegreeKernel::with_weights(weights.clone())?
            }
            None => {
                let degree = self.degree.unwrap_or(DEFAULT_DEGREE);
                if self.standard_weights {
                    WeightedDegreeKernel::standard(degree)?
                } else {
                    WeightedDegreeKernel::new(degree)?
                }
            }
        };

        Ok(if self.normalize {
            kernel.normalized()
        } else {
            kernel
        })
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (`<label> <sequence>` per line)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    kernel: KernelArgs,

    /// Sequence alphabet: dna, rna or protein
    #[arg(short, long, default_value = "dna")]
    alphabet: Alphabet,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001")]
    epsilon: f64,

    /// Maximum iterations
    #[arg(short, long, default_value = "10000")]
    max_iterations: usize,

    /// Kernel cache size in MB
    #[arg(long, default_value = "100")]
    cache_size: usize,

    /// Disable the shrinking heuristic
    #[arg(long)]
    no_shrinking: bool,

    /// Working set selection strategy
    #[arg(long, default_value = "second-order")]
    working_set_strategy: CliWorkingSetStrategy,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliWorkingSetStrategy {
    /// Maximal violating i, second-order gain for j (default)
    #[value(name = "second-order")]
    SecondOrder,
    /// Maximal violating pair (SVMlight style)
    #[value(name = "steepest-descent")]
    SteepestDescent,
}

impl From<CliWorkingSetStrategy> for WorkingSetStrategy {
    fn from(cli_strategy: CliWorkingSetStrategy) -> Self {
        match cli_strategy {
            CliWorkingSetStrategy::SecondOrder => WorkingSetStrategy::SecondOrder,
            CliWorkingSetStrategy::SteepestDescent => WorkingSetStrategy::SteepestDescent,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (labeled sequences or FASTA)
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show confidence scores
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labeled test data file
    #[arg(long)]
    data: PathBuf,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct SimilarityArgs {
    /// First sequence
    first: String,

    /// Second sequence
    second: String,

    #[command(flatten)]
    kernel: KernelArgs,

    /// Sequence alphabet: dna, rna or protein
    #[arg(short, long, default_value = "dna")]
    alphabet: Alphabet,
}

#[derive(Args)]
struct DemoArgs {
    /// Number of sequences (half positive, half negative)
    #[arg(long, default_value = "100")]
    samples: usize,

    /// Sequence length
    #[arg(long, default_value = "20")]
    length: usize,

    /// Kernel degree
    #[arg(long, default_value = "10")]
    degree: usize,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "10.0")]
    c: f64,

    /// Motif planted in positive sequences
    #[arg(long, default_value = "TATAAT")]
    motif: String,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Similarity(args) => similarity_command(args),
        Commands::Demo(args) => demo_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model...");
    info!("Data file: {:?}", args.data);
    info!(
        "Parameters: C={}, epsilon={}, max_iter={}",
        args.c, args.epsilon, args.max_iterations
    );

    let kernel = args.kernel.build()?;
    let dataset = LabeledSequences::from_file(&args.data, args.alphabet.clone())?;
    info!(
        "Loaded {} sequences of length {}",
        dataset.len(),
        dataset.sequence_length()
    );

    let (positive, negative, _) = validation::check_label_balance(&dataset);
    info!("Label balance: {positive} positive, {negative} negative");
    if !validation::has_both_classes(dataset.labels()) {
        warn!("Training data contains a single class; the model will predict it for every input");
    }

    let model = SVM::with_kernel(kernel)
        .with_alphabet(args.alphabet)
        .with_c(args.c)
        .with_epsilon(args.epsilon)
        .with_max_iterations(args.max_iterations)
        .with_cache_size(args.cache_size * 1024 * 1024) // Convert MB to bytes
        .with_shrinking(!args.no_shrinking)
        .with_working_set_strategy(args.working_set_strategy.into())
        .train(&dataset)?;

    info!("Training completed successfully");

    let info = model.info();
    info!("Support vectors: {}", info.n_support_vectors);
    info!("Bias: {:.6}", info.bias);

    // Save model
    let serializable = SerializableModel::from_trained_model(&model);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    // Quick evaluation on training data
    let accuracy = model.evaluate(&dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading prediction data from: {:?}", args.data);
    let loaded = load_sequences(&args.data, model.alphabet().clone())?;

    info!(
        "Making predictions using model with {} support vectors",
        serializable_model.metadata.n_support_vectors
    );
    let predictions = model.predict_batch(&loaded.sequences)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        writer,
        "# Format: id predicted_label{}",
        if args.confidence { " confidence" } else { "" }
    )?;

    for (id, pred) in loaded.ids.iter().zip(predictions.iter()) {
        if args.confidence {
            writeln!(writer, "{} {} {:.6}", id, pred.label, pred.confidence())?;
        } else {
            writeln!(writer, "{} {}", id, pred.label)?;
        }
    }
    writer.flush()?;

    if let Some(output_path) = args.output {
        info!("Predictions saved to: {output_path:?}");
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let dataset = LabeledSequences::from_file(&args.data, model.alphabet().clone())?;

    info!(
        "Evaluating model with {} support vectors",
        serializable_model.metadata.n_support_vectors
    );
    let metrics = model.evaluate_detailed(&dataset)?;

    // Show evaluation results
    println!("=== Model Evaluation ===");
    serializable_model.print_summary();

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;

    serializable_model.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", serializable_model.support_vectors.len());

    let n_show = serializable_model.support_vectors.len().min(5);
    for (sv, alpha_y) in serializable_model
        .support_vectors
        .iter()
        .zip(serializable_model.alpha_y.iter())
        .take(n_show)
    {
        println!("  {sv}  α*y = {alpha_y:.6}");
    }
    if serializable_model.support_vectors.len() > n_show {
        println!(
            "  ... ({} more)",
            serializable_model.support_vectors.len() - n_show
        );
    }

    Ok(())
}

fn similarity_command(args: SimilarityArgs) -> Result<()> {
    let kernel = args.kernel.build()?;
    let store = SequenceStore::new(&[&args.first, &args.second], args.alphabet)?;
    let value = kernel.similarity(store.get(0), store.get(1))?;
    println!("{value}");
    Ok(())
}

fn demo_command(args: DemoArgs) -> Result<()> {
    let config = MotifConfig {
        n_positive: args.samples / 2,
        n_negative: args.samples - args.samples / 2,
        length: args.length,
        motif: args.motif.clone(),
        seed: args.seed,
        ..MotifConfig::default()
    };
    info!(
        "Generating {} sequences of length {} with motif {} (seed {})",
        args.samples, args.length, args.motif, args.seed
    );
    let dataset = planted_motif(&config)?;

    let model = SVM::with_kernel(WeightedDegreeKernel::new(args.degree)?)
        .with_c(args.c)
        .train(&dataset)?;
    let predictions = model.predict_dataset(&dataset)?;

    let predicted: Vec<Label> = predictions.iter().map(|p| p.label).collect();
    println!("Predicted: {}", format_labels(&predicted));
    println!("True:      {}", format_labels(dataset.labels()));

    let accuracy = model.evaluate(&dataset)?;
    println!(
        "Support vectors: {}, training accuracy: {:.2}%",
        model.info().n_support_vectors,
        accuracy * 100.0
    );

    Ok(())
}

fn format_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
