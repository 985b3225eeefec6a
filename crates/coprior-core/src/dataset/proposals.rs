//! Precomputed region proposal files and their join into dataset records.
//!
//! A proposal file is a JSON list of per-image entries carrying candidate
//! boxes and their objectness logits. Joining attaches each entry to the
//! matching image record and sorts its boxes by objectness descending, so
//! downstream consumers can truncate to the top-k directly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DatasetError;
use crate::types::{ImageRecord, Proposals};

/// One image's entry in a proposal file, as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalEntry {
    pub image_id: i64,
    /// Boxes in [x1, y1, x2, y2] format
    pub boxes: Vec<[f32; 4]>,
    pub objectness_logits: Vec<f32>,
}

/// A loaded proposal file, indexed by image id.
#[derive(Debug)]
pub struct ProposalSet {
    by_image: HashMap<i64, Proposals>,
    path: PathBuf,
}

impl ProposalSet {
    /// Load a proposal file from disk.
    ///
    /// Entries with mismatched box/logit list lengths are rejected. A
    /// duplicate image id keeps the last entry, matching index-overwrite
    /// semantics of the upstream producers.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let entries: Vec<ProposalEntry> =
            serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut by_image = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.boxes.len() != entry.objectness_logits.len() {
                return Err(DatasetError::ProposalLengthMismatch {
                    image_id: entry.image_id,
                    boxes: entry.boxes.len(),
                    logits: entry.objectness_logits.len(),
                });
            }
            let previous = by_image.insert(
                entry.image_id,
                Proposals {
                    boxes: entry.boxes,
                    objectness_logits: entry.objectness_logits,
                },
            );
            if previous.is_some() {
                tracing::warn!(
                    "Duplicate proposal entry for image {} in {:?}, keeping the last",
                    entry.image_id,
                    path,
                );
            }
        }

        tracing::debug!("Loaded {} proposal entries from {:?}", by_image.len(), path);

        Ok(Self {
            by_image,
            path: path.to_path_buf(),
        })
    }

    /// Number of images with proposals.
    pub fn len(&self) -> usize {
        self.by_image.len()
    }

    /// Whether the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.by_image.is_empty()
    }

    /// Proposals for a single image, if present.
    pub fn get(&self, image_id: i64) -> Option<&Proposals> {
        self.by_image.get(&image_id)
    }

    /// Attach proposals to every record, sorted by objectness descending.
    ///
    /// Every record's image id must have an entry; a missing id is an error
    /// rather than a silently proposal-less record.
    pub fn join(&self, records: &mut [ImageRecord]) -> Result<(), DatasetError> {
        for record in records.iter_mut() {
            let proposals =
                self.by_image
                    .get(&record.image_id)
                    .ok_or_else(|| DatasetError::MissingProposals {
                        image_id: record.image_id,
                        path: self.path.clone(),
                    })?;
            record.proposals = Some(sort_by_objectness(proposals));
        }
        Ok(())
    }
}

/// Reorder a proposal list by objectness logit, highest first.
fn sort_by_objectness(proposals: &Proposals) -> Proposals {
    let mut order: Vec<usize> = (0..proposals.len()).collect();
    order.sort_by(|&a, &b| {
        proposals.objectness_logits[b]
            .partial_cmp(&proposals.objectness_logits[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Proposals {
        boxes: order.iter().map(|&i| proposals.boxes[i]).collect(),
        objectness_logits: order
            .iter()
            .map(|&i| proposals.objectness_logits[i])
            .collect(),
    }
}
