//! coprior Core - Class co-occurrence priors from detection datasets.
//!
//! coprior turns the instance annotations of an object-detection dataset into
//! a class co-occurrence matrix: how often each pair of categories appears in
//! the same image, conditioned on the row category's own appearance rate. The
//! matrix is consumed as an attention prior by relation-detection models.
//!
//! # Architecture
//!
//! ```text
//! COCO JSON files → Dataset → merge (+ proposal join) → tally → PriorRecord
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use coprior_core::{CoOccurrencePrior, Dataset, MergeOptions};
//!
//! fn main() -> coprior_core::Result<()> {
//!     let train = Dataset::from_coco_file("instances_train.json".as_ref())?;
//!     let prior = CoOccurrencePrior::from_datasets(vec![train], &MergeOptions::default())?;
//!     println!("{} classes", prior.num_classes());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod dataset;
pub mod error;
pub mod output;
pub mod prior;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use dataset::{merge_datasets, Dataset, MergeOptions, ProposalSet};
pub use error::{ConfigError, CopriorError, DatasetError, DatasetResult, Result};
pub use output::{OutputFormat, OutputWriter, PriorRecord};
pub use prior::CoOccurrencePrior;
pub use types::{Annotation, ImageRecord, Proposals};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
