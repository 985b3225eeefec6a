//! The `coprior compute` command: merge datasets and write the prior.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use coprior_core::output::OutputFormat as CoreOutputFormat;
use coprior_core::{CoOccurrencePrior, Config, Dataset, MergeOptions, OutputWriter, PriorRecord};

/// Arguments for the `compute` command.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// COCO-format dataset file (repeatable; defaults to config datasets.train)
    #[arg(short, long = "dataset")]
    pub datasets: Vec<PathBuf>,

    /// Proposal file, one per dataset in order (enables proposal joining)
    #[arg(long = "proposal-file")]
    pub proposal_files: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to config output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Output format choices exposed on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Csv => CoreOutputFormat::Csv,
        }
    }
}

/// Execute the compute command.
pub fn execute(args: ComputeArgs, config: &Config) -> anyhow::Result<()> {
    let paths = if args.datasets.is_empty() {
        config.train_paths()
    } else {
        args.datasets.clone()
    };
    if paths.is_empty() {
        anyhow::bail!(
            "No datasets given. Pass --dataset or set datasets.train in the config file."
        );
    }

    let datasets = load_datasets(&paths)?;
    let image_count: usize = datasets.iter().map(|d| d.records.len()).sum();

    let mut options = MergeOptions::from_config(config);
    if !args.proposal_files.is_empty() {
        options.proposal_files = Some(args.proposal_files.clone());
    }

    let prior = CoOccurrencePrior::from_datasets(datasets, &options)?;
    let record = PriorRecord::from(&prior);

    let nonzero = prior.matrix().iter().filter(|&&v| v > 0.0).count();
    tracing::info!(
        "Computed prior: {} classes, {} images, {} non-zero pair entries",
        prior.num_classes(),
        image_count,
        nonzero,
    );

    let format: CoreOutputFormat = match args.format {
        Some(format) => format.into(),
        // Config formats are validated at load time; fall back for defaults.
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };
    let pretty = args.pretty || config.output.pretty;

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
            writer.write(&record)?;
            writer.flush()?;
            tracing::info!("Wrote prior to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), format, pretty);
            writer.write(&record)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Load all dataset files, with a progress bar when there are several.
fn load_datasets(paths: &[PathBuf]) -> anyhow::Result<Vec<Dataset>> {
    let pb = create_progress_bar(paths.len() as u64);

    let mut datasets = Vec::with_capacity(paths.len());
    for path in paths {
        pb.set_message(path.display().to_string());
        datasets.push(Dataset::from_coco_file(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(datasets)
}

/// Create a progress bar for dataset loading.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}
