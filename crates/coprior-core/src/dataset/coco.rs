//! COCO-format dataset loading.
//!
//! Parses a COCO-style JSON file (`images` / `annotations` / `categories`
//! arrays) into per-image [`ImageRecord`]s. Sparse COCO category ids are
//! remapped to contiguous indices in ascending id order, and the ordered
//! class-name list is derived from the same ordering.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::DatasetError;
use crate::types::{Annotation, ImageRecord};

use super::Dataset;

/// Raw COCO annotation as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct CocoAnnotation {
    pub id: i64,
    pub image_id: i64,
    pub category_id: i64,
    /// Bbox in [x, y, width, height] format
    #[serde(default)]
    pub bbox: Option<[f32; 4]>,
    #[serde(default)]
    pub area: Option<f32>,
    /// 0/1 on disk
    #[serde(default)]
    pub iscrowd: i32,
}

/// Raw COCO image info.
#[derive(Debug, Clone, Deserialize)]
pub struct CocoImage {
    pub id: i64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

/// Raw COCO category info.
#[derive(Debug, Clone, Deserialize)]
pub struct CocoCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub supercategory: Option<String>,
}

/// Raw COCO dataset file.
#[derive(Debug, Clone, Deserialize)]
pub struct CocoFile {
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

/// Parse a COCO JSON file into a [`Dataset`].
///
/// The dataset name is the file stem. Images with no annotations yield
/// records with empty annotation lists. When the file has no `categories`
/// array the dataset carries no class names; annotations then have nothing
/// to map against and any annotation is an [`DatasetError::UnknownCategory`].
pub fn load_coco_file(path: &Path) -> Result<Dataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let file: CocoFile = serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    dataset_from_coco(name, file, path)
}

/// Build a [`Dataset`] from an already-parsed COCO file.
pub fn dataset_from_coco(
    name: String,
    file: CocoFile,
    path: &Path,
) -> Result<Dataset, DatasetError> {
    // Contiguous remapping: ascending category id order defines the index.
    let mut categories = file.categories;
    categories.sort_by_key(|c| c.id);
    let id_map: HashMap<i64, usize> = categories
        .iter()
        .enumerate()
        .map(|(index, c)| (c.id, index))
        .collect();
    let class_names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();

    // Group annotations by image id.
    let mut by_image: HashMap<i64, Vec<Annotation>> = HashMap::new();
    for ann in &file.annotations {
        let category_id =
            *id_map
                .get(&ann.category_id)
                .ok_or_else(|| DatasetError::UnknownCategory {
                    category_id: ann.category_id,
                    annotation_id: ann.id,
                    path: path.to_path_buf(),
                })?;
        by_image.entry(ann.image_id).or_default().push(Annotation {
            category_id,
            iscrowd: ann.iscrowd != 0,
            bbox: ann.bbox,
            area: ann.area,
        });
    }

    // One record per image, in file order.
    let records: Vec<ImageRecord> = file
        .images
        .iter()
        .map(|img| ImageRecord {
            image_id: img.id,
            file_name: img.file_name.clone(),
            width: img.width,
            height: img.height,
            annotations: by_image.remove(&img.id).unwrap_or_default(),
            proposals: None,
        })
        .collect();

    // Whatever is left in the grouping references image ids absent from the
    // images array; those annotations have no record to live on.
    if !by_image.is_empty() {
        let orphaned: usize = by_image.values().map(|anns| anns.len()).sum();
        tracing::warn!(
            "Dropping {} annotations in {:?} that reference unknown image ids",
            orphaned,
            path,
        );
    }

    tracing::info!(
        "Loaded dataset '{}': {} images, {} annotations, {} classes",
        name,
        records.len(),
        file.annotations.len(),
        class_names.len(),
    );

    let class_names = if class_names.is_empty() {
        None
    } else {
        Some(class_names)
    };

    Ok(Dataset {
        name,
        records,
        class_names,
    })
}
