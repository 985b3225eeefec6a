//! The `coprior inspect` command: per-dataset annotation statistics.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;

use coprior_core::{Config, Dataset};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// COCO-format dataset files (defaults to config datasets.train)
    pub datasets: Vec<PathBuf>,

    /// Number of classes to list in the appearance table
    #[arg(long, default_value = "15")]
    pub top: usize,
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let paths = if args.datasets.is_empty() {
        config.train_paths()
    } else {
        args.datasets.clone()
    };
    if paths.is_empty() {
        anyhow::bail!(
            "No datasets given. Pass dataset paths or set datasets.train in the config file."
        );
    }

    for path in &paths {
        let dataset = Dataset::from_coco_file(path)?;
        print_summary(&dataset, args.top);
    }

    Ok(())
}

/// Print a summary of one dataset to stdout.
fn print_summary(dataset: &Dataset, top: usize) {
    let images = dataset.records.len();
    let instances = dataset.instance_count();
    let crowd: usize = dataset
        .records
        .iter()
        .flat_map(|r| &r.annotations)
        .filter(|a| a.iscrowd)
        .count();
    let unannotated = dataset
        .records
        .iter()
        .filter(|r| !r.has_annotations())
        .count();

    println!("Dataset: {}", dataset.name);
    println!("  images:              {images}");
    println!("  instances:           {instances}");
    println!("  crowd instances:     {crowd}");
    println!("  unannotated images:  {unannotated}");

    let Some(class_names) = &dataset.class_names else {
        println!("  classes:             (no class names)");
        return;
    };
    println!("  classes:             {}", class_names.len());

    // Images containing each class at least once, crowd excluded.
    let mut appearances: HashMap<usize, usize> = HashMap::new();
    for record in &dataset.records {
        for category in record.present_categories() {
            *appearances.entry(category).or_default() += 1;
        }
    }

    let mut rows: Vec<(usize, usize)> = appearances.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("  top classes by image appearances:");
    for (category, count) in rows.into_iter().take(top) {
        let name = class_names
            .get(category)
            .map(|s| s.as_str())
            .unwrap_or("?");
        println!("    {name:<24} {count}");
    }
}
