//! Error types for the coprior library.
//!
//! Errors are organized by layer (configuration vs. dataset handling) and
//! carry the context needed to act on them: dataset names, file paths,
//! mismatched counts.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for coprior operations.
#[derive(Error, Debug)]
pub enum CopriorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dataset loading and merging errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Dataset loading and merging errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// No datasets were given to merge
    #[error("No datasets given")]
    NoDatasets,

    /// A named dataset has zero image records
    #[error("Dataset '{name}' is empty")]
    EmptyDataset { name: String },

    /// Proposal file count does not match dataset count
    #[error("Got {datasets} datasets but {proposal_files} proposal files")]
    ProposalCountMismatch {
        datasets: usize,
        proposal_files: usize,
    },

    /// A dataset carries instance annotations but no class-name metadata
    #[error("Dataset '{name}' has annotations but no class names")]
    MissingClassNames { name: String },

    /// Class-name lists disagree between datasets
    #[error("Class names of dataset '{name}' do not match those of '{first}'")]
    ClassNameMismatch { name: String, first: String },

    /// An annotation references a category id absent from the categories list
    #[error("Unknown category id {category_id} in annotation {annotation_id} of {path}")]
    UnknownCategory {
        category_id: i64,
        annotation_id: i64,
        path: PathBuf,
    },

    /// A record's image id has no entry in the proposal file
    #[error("No proposals for image {image_id} in {path}")]
    MissingProposals { image_id: i64, path: PathBuf },

    /// A proposal entry's box and objectness lists disagree in length
    #[error("Proposal entry for image {image_id} has {boxes} boxes but {logits} objectness logits")]
    ProposalLengthMismatch {
        image_id: i64,
        boxes: usize,
        logits: usize,
    },

    /// Failed to read a dataset or proposal file from disk
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Failed to parse a dataset or proposal file
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Convenience type alias for coprior results.
pub type Result<T> = std::result::Result<T, CopriorError>;

/// Convenience type alias for dataset-layer results.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
