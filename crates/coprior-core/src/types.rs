//! Core data types for detection annotation records.
//!
//! These types are the in-memory form of a detection dataset after loading:
//! one record per image, each holding its instance annotations and optionally
//! the precomputed region proposals joined from a proposal file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single instance annotation within an image.
///
/// `category_id` is a contiguous index in `[0, num_classes)` — COCO-style
/// sparse category ids are remapped at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Contiguous category index
    pub category_id: usize,

    /// Crowd flag: an indistinguishable group rather than a countable object
    #[serde(default)]
    pub iscrowd: bool,

    /// Bounding box in [x, y, width, height] format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,

    /// Segmentation area in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f32>,
}

impl Annotation {
    /// Create a non-crowd annotation with just a category index.
    pub fn new(category_id: usize) -> Self {
        Self {
            category_id,
            iscrowd: false,
            bbox: None,
            area: None,
        }
    }

    /// Create a crowd-flagged annotation.
    pub fn crowd(category_id: usize) -> Self {
        Self {
            iscrowd: true,
            ..Self::new(category_id)
        }
    }
}

/// Precomputed region proposals for one image.
///
/// Boxes are kept sorted by objectness descending after joining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposals {
    /// Candidate boxes in [x1, y1, x2, y2] format
    pub boxes: Vec<[f32; 4]>,

    /// Objectness logit per box
    pub objectness_logits: Vec<f32>,
}

impl Proposals {
    /// Number of proposal boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether there are no proposal boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// One image's worth of a detection dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image id, unique within its dataset
    pub image_id: i64,

    /// Image file name as recorded in the dataset
    pub file_name: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Instance annotations for this image
    pub annotations: Vec<Annotation>,

    /// Region proposals joined from a proposal file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposals: Option<Proposals>,
}

impl ImageRecord {
    /// Distinct non-crowd category indices present in this image.
    ///
    /// Duplicates collapse: an image contributes each category at most once,
    /// and crowd-flagged instances do not contribute at all.
    pub fn present_categories(&self) -> BTreeSet<usize> {
        self.annotations
            .iter()
            .filter(|a| !a.iscrowd)
            .map(|a| a.category_id)
            .collect()
    }

    /// Whether this record has any instance annotations (crowd included).
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(annotations: Vec<Annotation>) -> ImageRecord {
        ImageRecord {
            image_id: 1,
            file_name: "000000000001.jpg".to_string(),
            width: 640,
            height: 480,
            annotations,
            proposals: None,
        }
    }

    #[test]
    fn test_present_categories_collapses_duplicates() {
        let rec = record(vec![
            Annotation::new(3),
            Annotation::new(3),
            Annotation::new(7),
        ]);
        let present: Vec<usize> = rec.present_categories().into_iter().collect();
        assert_eq!(present, vec![3, 7]);
    }

    #[test]
    fn test_present_categories_excludes_crowd() {
        let rec = record(vec![Annotation::new(2), Annotation::crowd(5)]);
        let present = rec.present_categories();
        assert!(present.contains(&2));
        assert!(!present.contains(&5));
    }

    #[test]
    fn test_crowd_only_image_has_no_present_categories() {
        let rec = record(vec![Annotation::crowd(5)]);
        assert!(rec.present_categories().is_empty());
        assert!(rec.has_annotations());
    }

    #[test]
    fn test_annotation_serde_defaults_iscrowd_false() {
        let json = r#"{"category_id": 4}"#;
        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.category_id, 4);
        assert!(!ann.iscrowd);
        assert!(ann.bbox.is_none());
    }

    #[test]
    fn test_annotation_serde_skips_none_bbox() {
        let ann = Annotation::new(1);
        let json = serde_json::to_string(&ann).unwrap();
        assert!(!json.contains("bbox"));
        assert!(!json.contains("area"));
    }
}
