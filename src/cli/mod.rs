//! Tabular Pipeline CLI Module
//!
//! Command-line interface for running evaluations and fetching artifacts.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{ArtifactId, ArtifactStore};
use crate::pipeline::{Pipeline, PipelineConfig, PipelineOutcome};
use crate::training::Algorithm;
use crate::utils::DatasetLoader;

// ─── Output styling ────────────────────────────────────────────────────────────

/// Visible width of the summary box body
const BOX_WIDTH: usize = 56;

#[derive(Clone, Copy)]
enum Tone {
    Dim,
    Accent,
    Muted,
    Ok,
}

impl Tone {
    fn paint(self, s: &str) -> ColoredString {
        let (r, g, b) = match self {
            Tone::Dim => (100, 100, 100),
            Tone::Accent => (120, 170, 255),
            Tone::Muted => (140, 140, 140),
            Tone::Ok => (100, 210, 120),
        };
        s.truecolor(r, g, b)
    }
}

/// Printed width of `s`, skipping SGR escape sequences
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

/// Key/value rows framed in a box, one string per printed line
fn boxed(rows: &[(&str, String)]) -> Vec<String> {
    let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let rule = "─".repeat(BOX_WIDTH + 2);

    let mut lines = vec![format!("┌{}┐", rule)];
    for (key, value) in rows {
        let cell = format!("{:<key_width$} {}", key, value);
        let pad = BOX_WIDTH.saturating_sub(visible_width(&cell));
        lines.push(format!("│ {}{} │", cell, " ".repeat(pad)));
    }
    lines.push(format!("└{}┘", rule));
    lines
}

fn print_box(rows: &[(&str, String)]) {
    for line in boxed(rows) {
        println!("  {}", line);
    }
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", Tone::Dim.paint(&"─".repeat(BOX_WIDTH)));
}

fn step_ok(msg: &str) {
    println!("  {} {}", Tone::Ok.paint("✓"), msg);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tabular-pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and evaluate a classifier on tabular data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train once and report train/test metrics
    Generate {
        /// Input data file (CSV with a header row)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name, matched exactly
        #[arg(short, long)]
        target: Option<String>,

        /// Algorithm name, e.g. "Logistic Regression"
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Fraction of rows held out for testing [default: 0.2]
        #[arg(long)]
        test_size: Option<f64>,

        /// Seed for the split and the learning-curve folds
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for learning-curve artifacts
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Skip the learning curve
        #[arg(long)]
        no_learning_curve: bool,

        /// JSON pipeline configuration; flags override its fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the result JSON here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch a stored learning-curve image
    LearningCurve {
        /// Artifact directory
        #[arg(long)]
        artifacts: PathBuf,

        /// Artifact id printed by `generate`
        #[arg(long)]
        id: String,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the header columns of a data file
    Columns {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// List supported algorithms
    Algorithms,
}

/// Arguments of the `generate` command
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub data: PathBuf,
    pub target: Option<String>,
    pub algorithm: Option<String>,
    pub test_size: Option<f64>,
    pub seed: Option<u64>,
    pub artifacts: Option<PathBuf>,
    pub no_learning_curve: bool,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Merge the optional config file with the flags
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(target) = &self.target {
            config.target_column = target.clone();
        }
        if let Some(algorithm) = &self.algorithm {
            config.algorithm = algorithm.clone();
        }
        if let Some(ratio) = self.test_size {
            config.test_ratio = ratio;
        }
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(dir) = &self.artifacts {
            config.artifact_dir = Some(dir.clone());
        }
        if self.no_learning_curve {
            config.learning_curve.enabled = false;
        }

        if config.target_column.is_empty() {
            anyhow::bail!("No target column given; pass --target or set target_column in --config");
        }
        if config.algorithm.is_empty() {
            anyhow::bail!(
                "No algorithm given; pass --algorithm with one of: {}",
                Algorithm::supported_names().join(", ")
            );
        }

        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_generate(args: &GenerateArgs) -> anyhow::Result<PipelineOutcome> {
    let config = args.to_config()?;

    section("Generate");
    print_box(&[
        ("data", args.data.display().to_string()),
        ("target", config.target_column.clone()),
        ("algorithm", config.algorithm.clone()),
        ("test size", config.test_ratio.to_string()),
    ]);

    print!("  {} Training {}... ", Tone::Accent.paint("›"), config.algorithm.cyan());
    let start = Instant::now();
    let outcome = Pipeline::new(config).run_path(&args.data)?;
    println!("{} {}", Tone::Ok.paint("done"), Tone::Dim.paint(&format!("{:?}", start.elapsed())));

    println!();
    let (train, test) = (&outcome.result.train, &outcome.result.test);
    println!("  {:<16} {:>10} {:>10}", "", Tone::Muted.paint("train"), Tone::Muted.paint("test"));
    for (metric, a, b) in [
        ("Accuracy", train.accuracy, test.accuracy),
        ("Precision", train.precision, test.precision),
        ("F1", train.f1, test.f1),
    ] {
        println!("  {:<16} {:>10.4} {:>10.4}", Tone::Muted.paint(metric), a, b);
    }

    let json = serde_json::to_string_pretty(&outcome.result)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!();
            step_ok(&format!("Result written to {}", path.display()));
        }
        None => {
            println!();
            println!("{}", json);
        }
    }

    match outcome.learning_curve_artifact {
        Some(id) => step_ok(&format!("Learning curve {}", id.to_string().white().bold())),
        None if outcome.learning_curve.is_some() => {
            println!("  {}", Tone::Muted.paint("learning curve generated, no --artifacts directory to store it"));
        }
        None => {}
    }
    println!();

    Ok(outcome)
}

pub fn cmd_learning_curve(artifacts: &Path, id: &str, output: &Path) -> anyhow::Result<()> {
    section("Learning Curve");

    let id: ArtifactId = id.parse()?;
    let store = ArtifactStore::new(artifacts)?;
    let bytes = store.read(id)?;

    std::fs::write(output, &bytes)?;
    step_ok(&format!("{} bytes → {}", bytes.len(), output.display()));
    println!();

    Ok(())
}

pub fn cmd_columns(data: &Path) -> anyhow::Result<Vec<String>> {
    section("Columns");

    let columns = DatasetLoader::new().column_names(data)?;
    for (i, name) in columns.iter().enumerate() {
        println!("  {:>3}  {}", Tone::Dim.paint(&i.to_string()), name);
    }
    println!();

    Ok(columns)
}

pub fn cmd_algorithms() -> anyhow::Result<()> {
    section("Algorithms");

    for algorithm in Algorithm::ALL {
        println!(
            "  {:<24} {:<12} {}",
            algorithm.name().white().bold(),
            Tone::Muted.paint(&algorithm.family().to_string()),
            Tone::Dim.paint(algorithm.description())
        );
    }
    println!();

    Ok(())
}
