//! Dataset handling: loading, metadata validation, and merging.
//!
//! A [`Dataset`] is an explicit value — records plus optional class names —
//! passed directly to the merge and tally instead of being looked up from a
//! process-global registry. [`merge_datasets`] flattens several datasets into
//! one record list after validating them against each other.

pub mod coco;
pub mod proposals;

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{DatasetError, DatasetResult};
use crate::types::ImageRecord;

pub use coco::{load_coco_file, CocoFile};
pub use proposals::ProposalSet;

/// A named detection dataset held fully in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Dataset name (file stem for file-loaded datasets)
    pub name: String,

    /// One record per image
    pub records: Vec<ImageRecord>,

    /// Ordered class names defining the category index space, if known
    pub class_names: Option<Vec<String>>,
}

impl Dataset {
    /// Create a dataset from parts.
    pub fn new(
        name: impl Into<String>,
        records: Vec<ImageRecord>,
        class_names: Option<Vec<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            records,
            class_names,
        }
    }

    /// Load a COCO-format JSON file as a dataset.
    pub fn from_coco_file(path: &Path) -> DatasetResult<Self> {
        coco::load_coco_file(path)
    }

    /// Total instance annotations across all records.
    pub fn instance_count(&self) -> usize {
        self.records.iter().map(|r| r.annotations.len()).sum()
    }
}

/// Options controlling the merge, mirroring the training-side configuration.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Accepted for interface parity with the caller's config; the merge
    /// itself never filters annotation-less records.
    pub filter_empty: bool,

    /// Keypoint threshold from the caller's config; unused by the merge and
    /// by the tally.
    pub min_keypoints: u32,

    /// One proposal file per dataset, joined before flattening when set
    pub proposal_files: Option<Vec<PathBuf>>,
}

impl MergeOptions {
    /// Derive merge options from a loaded config.
    ///
    /// The keypoint threshold only takes effect when the keypoint head is
    /// enabled; proposal files are only carried when proposal loading is on.
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter_empty: config.dataloader.filter_empty_annotations,
            min_keypoints: config.model.effective_min_keypoints(),
            proposal_files: if config.model.load_proposals {
                Some(config.proposal_paths())
            } else {
                None
            },
        }
    }
}

/// Merge datasets into one flat record list.
///
/// Validates that the dataset list is non-empty, that every dataset has at
/// least one record, that the proposal file count (when given) matches the
/// dataset count, and that class-name metadata is consistent. Proposals are
/// joined into each dataset's records before flattening. Dataset order is
/// preserved in the output.
pub fn merge_datasets(
    datasets: Vec<Dataset>,
    options: &MergeOptions,
) -> DatasetResult<Vec<ImageRecord>> {
    if datasets.is_empty() {
        return Err(DatasetError::NoDatasets);
    }
    for dataset in &datasets {
        if dataset.records.is_empty() {
            return Err(DatasetError::EmptyDataset {
                name: dataset.name.clone(),
            });
        }
    }
    check_class_name_consistency(&datasets)?;

    if let Some(files) = &options.proposal_files {
        if files.len() != datasets.len() {
            return Err(DatasetError::ProposalCountMismatch {
                datasets: datasets.len(),
                proposal_files: files.len(),
            });
        }
    }

    let mut merged = Vec::with_capacity(datasets.iter().map(|d| d.records.len()).sum());
    for (index, mut dataset) in datasets.into_iter().enumerate() {
        if let Some(files) = &options.proposal_files {
            let set = ProposalSet::from_file(&files[index])?;
            set.join(&mut dataset.records)?;
        }
        merged.extend(dataset.records);
    }

    tracing::info!("Merged {} image records", merged.len());
    Ok(merged)
}

/// Validate class-name metadata across datasets.
///
/// Every dataset that carries class names must match the first such list.
/// A dataset without class names is tolerated only while none of its records
/// has instance annotations.
fn check_class_name_consistency(datasets: &[Dataset]) -> DatasetResult<()> {
    let reference = datasets
        .iter()
        .find_map(|d| d.class_names.as_deref().map(|names| (d.name.as_str(), names)));

    for dataset in datasets {
        if let Some(names) = &dataset.class_names {
            if let Some((first_name, first_names)) = reference {
                if names.as_slice() != first_names {
                    return Err(DatasetError::ClassNameMismatch {
                        name: dataset.name.clone(),
                        first: first_name.to_string(),
                    });
                }
            }
        } else if dataset.records.iter().any(|r| r.has_annotations()) {
            return Err(DatasetError::MissingClassNames {
                name: dataset.name.clone(),
            });
        }
    }
    Ok(())
}
