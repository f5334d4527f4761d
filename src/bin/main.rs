//! kmethods command line interface
//!
//! Fit, cross-validate and tune kernel classifiers on CSV data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use kmethods::methods::{KnnConfig, LogisticConfig, SvmConfig};
use kmethods::validation::KernelFamily;
use kmethods::{
    build_method, cross_validate, sanity_check, ConfusionCounts, CrossValidationReport, Dataset,
    KFold, KernelSpec, MethodConfig, MethodKind, RandomSearch, Result, SearchSpace,
};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "kmethods")]
#[command(about = "Kernel logistic regression, kernel SVM and kernel KNN for binary classification")]
#[command(version = env!("CARGO_PKG_VERSION"))]
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
    /// Fit a classifier and report training (and optional test) metrics
    Fit(FitArgs),
    /// K-fold cross-validation of one configuration
    Cv(CvArgs),
    /// Randomized hyperparameter search
    Search(SearchArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum CliMethod {
    /// Kernel logistic regression (IRLS)
    Klr,
    /// Kernel SVM (SMO)
    Svm,
    /// Kernel k-nearest neighbours
    Knn,
}

impl From<CliMethod> for MethodKind {
    fn from(method: CliMethod) -> Self {
        match method {
            CliMethod::Klr => MethodKind::Klr,
            CliMethod::Svm => MethodKind::Svm,
            CliMethod::Knn => MethodKind::Knn,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum CliKernel {
    Linear,
    Polynomial,
    Rbf,
}

impl From<CliKernel> for KernelFamily {
    fn from(kernel: CliKernel) -> Self {
        match kernel {
            CliKernel::Linear => KernelFamily::Linear,
            CliKernel::Polynomial => KernelFamily::Polynomial,
            CliKernel::Rbf => KernelFamily::Rbf,
        }
    }
}

/// Classifier selection, either from flags or from a JSON file
#[derive(Args, Clone, Debug)]
struct MethodArgs {
    /// JSON method configuration (overrides every method flag)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classifier
    #[arg(long, value_enum, default_value = "klr")]
    method: CliMethod,

    /// Kernel family
    #[arg(long, value_enum, default_value = "rbf")]
    kernel: CliKernel,

    /// Kernel coefficient (polynomial, rbf)
    #[arg(long, default_value = "1.0")]
    gamma: f64,

    /// Polynomial degree
    #[arg(long, default_value = "2")]
    degree: u32,

    /// Polynomial offset
    #[arg(long, default_value = "0.0")]
    offset: f64,

    /// Ridge regularization strength (klr)
    #[arg(long, default_value = "1.0")]
    lambda: f64,

    /// Iteration budget (klr: IRLS iterations, svm: SMO passes)
    #[arg(long)]
    max_iterations: Option<usize>,

    /// IRLS convergence tolerance (klr)
    #[arg(long, default_value = "1e-5")]
    tolerance: f64,

    /// Box constraint (svm)
    #[arg(short = 'C', long = "c", default_value = "1.0")]
    c: f64,

    /// SMO tolerance (svm)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Kernel cache size in MB (svm)
    #[arg(long)]
    cache_size: Option<usize>,

    /// Number of neighbours (knn)
    #[arg(long, default_value = "5")]
    n_neighbors: usize,

    /// Standardize features
    #[arg(long)]
    scale: bool,
}

impl MethodArgs {
    fn kernel_spec(&self) -> KernelSpec {
        match self.kernel {
            CliKernel::Linear => KernelSpec::Linear,
            CliKernel::Polynomial => KernelSpec::Polynomial {
                gamma: self.gamma,
                degree: self.degree,
                offset: self.offset,
            },
            CliKernel::Rbf => KernelSpec::Rbf { gamma: self.gamma },
        }
    }

    fn method_config(&self) -> Result<MethodConfig> {
        if let Some(path) = &self.config {
            info!("Reading method configuration from {path:?}");
            return read_json(path);
        }

        let kernel = self.kernel_spec();
        Ok(match self.method {
            CliMethod::Klr => {
                let mut config = LogisticConfig::default()
                    .with_kernel(kernel)
                    .with_lambda(self.lambda)
                    .with_tolerance(self.tolerance)
                    .with_scale(self.scale);
                if let Some(max_iterations) = self.max_iterations {
                    config = config.with_max_iterations(max_iterations);
                }
                MethodConfig::Klr(config)
            }
            CliMethod::Svm => {
                let mut config = SvmConfig::default()
                    .with_kernel(kernel)
                    .with_c(self.c)
                    .with_scale(self.scale);
                if let Some(max_iterations) = self.max_iterations {
                    config = config.with_max_iterations(max_iterations);
                }
                if let Some(epsilon) = self.epsilon {
                    config = config.with_epsilon(epsilon);
                }
                if let Some(cache_size) = self.cache_size {
                    config = config.with_cache_size(cache_size * 1024 * 1024);
                }
                MethodConfig::Svm(config)
            }
            CliMethod::Knn => MethodConfig::Knn(
                KnnConfig::default()
                    .with_kernel(kernel)
                    .with_n_neighbors(self.n_neighbors)
                    .with_scale(self.scale),
            ),
        })
    }
}

#[derive(Args)]
struct FitArgs {
    /// Training data (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    /// Test data (CSV)
    #[arg(long)]
    test: Option<PathBuf>,

    #[command(flatten)]
    method: MethodArgs,
}

#[derive(Args)]
struct CvArgs {
    /// Data (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    /// Number of folds
    #[arg(long, default_value = "5")]
    folds: usize,

    /// Shuffle the rows with this seed before splitting (needed when rows are sorted by label)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    method: MethodArgs,
}

#[derive(Args)]
struct SearchArgs {
    /// Data (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    /// Classifier to tune
    #[arg(long, value_enum, default_value = "klr")]
    method: CliMethod,

    /// Kernel family to tune
    #[arg(long, value_enum, default_value = "rbf")]
    kernel: CliKernel,

    /// JSON search space (overrides --method and --kernel)
    #[arg(long)]
    space: Option<PathBuf>,

    /// Number of sampled configurations
    #[arg(long, default_value = "10")]
    samples: usize,

    /// Number of folds
    #[arg(long, default_value = "5")]
    folds: usize,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Write every result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
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
        Commands::Fit(args) => fit_command(args),
        Commands::Cv(args) => cv_command(args),
        Commands::Search(args) => search_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load(path: &Path) -> Result<Dataset> {
    info!("Loading dataset from {path:?}");
    let dataset = Dataset::from_csv_file(path)?;
    info!("Loaded {dataset}");
    Ok(dataset)
}

fn fit_command(args: FitArgs) -> Result<()> {
    let config = args.method.method_config()?;
    let train = load(&args.data)?;

    let mut model = build_method(&config)?;
    let summary = model.fit(&train)?;
    sanity_check(model.as_ref(), &train, 5)?;

    println!("=== Fit ===");
    println!("Model: {config}");
    println!("Training samples: {}", summary.n_samples);
    println!("Iterations: {} ({:?})", summary.iterations, summary.status);

    print_metrics("Training", &model.confusion(&train)?);

    if let Some(test_path) = args.test {
        let test = load(&test_path)?;
        print_metrics("Test", &model.confusion(&test)?);
    }

    Ok(())
}

fn cv_command(args: CvArgs) -> Result<()> {
    let config = args.method.method_config()?;
    let dataset = load(&args.data)?;

    let mut kfold = KFold::new(args.folds)?;
    if let Some(seed) = args.seed {
        kfold = kfold.with_shuffle(seed);
    }

    let report = cross_validate(&config, &dataset, &kfold)?;
    print_report(&report);

    if let Some(path) = args.output {
        write_json(&path, &report)?;
        info!("Report saved to {path:?}");
    }
    Ok(())
}

fn search_command(args: SearchArgs) -> Result<()> {
    let space = match &args.space {
        Some(path) => read_json(path)?,
        None => SearchSpace::new(args.method.into(), args.kernel.into()),
    };
    let dataset = load(&args.data)?;

    let mut search = RandomSearch::new(space, args.samples, args.seed)?.with_folds(args.folds);
    let results = search.run(&dataset)?;
    println!("=== Random Search ===");
    println!("Evaluated configurations: {}", results.len());

    if let Some(best) = search.best() {
        println!("Best: {}", best.config);
        print_report(&best.report);
    }

    if let Some(path) = args.output {
        write_json(&path, search.results())?;
        info!("Search results saved to {path:?}");
    }
    Ok(())
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| format!("{v:.4}"))
}

fn print_metrics(title: &str, counts: &ConfusionCounts) {
    println!("\n{title} Results:");
    println!("  Accuracy:        {:.2}%", counts.accuracy() * 100.0);
    println!("  Recall:          {}", format_metric(counts.recall()));
    println!("  Precision:       {}", format_metric(counts.precision()));
    println!("  F1 Score:        {}", format_metric(counts.f1_score()));
    println!("  True Positives:  {}", counts.true_positives);
    println!("  True Negatives:  {}", counts.true_negatives);
    println!("  False Positives: {}", counts.false_positives);
    println!("  False Negatives: {}", counts.false_negatives);
}

fn print_report(report: &CrossValidationReport) {
    println!("\n{}-fold cross-validation of {}", report.n_folds(), report.config);
    for (name, summary) in [
        ("accuracy", &report.accuracy),
        ("recall", &report.recall),
        ("precision", &report.precision),
        ("f1", &report.f1),
    ] {
        println!(
            "  {name:<10} mean {} std {} ({} folds)",
            format_metric(summary.mean),
            format_metric(summary.std),
            summary.defined_folds
        );
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
