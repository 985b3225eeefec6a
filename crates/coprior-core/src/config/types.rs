//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Training dataset files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatasetsConfig {
    /// COCO-format JSON files to merge for training
    pub train: Vec<String>,

    /// One proposal file per training dataset, used when
    /// `model.load_proposals` is enabled
    pub proposal_files_train: Vec<String>,
}

/// Dataloader flags carried through to the merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataloaderConfig {
    /// Whether the training loader drops images without annotations.
    /// Carried for parity with the training pipeline; the tally counts
    /// over raw records either way.
    pub filter_empty_annotations: bool,
}

impl Default for DataloaderConfig {
    fn default() -> Self {
        Self {
            filter_empty_annotations: true,
        }
    }
}

/// Model-side flags that shape dataset preparation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Join precomputed region proposals into the records before merging
    pub load_proposals: bool,

    /// Whether the keypoint head is enabled
    pub keypoint_on: bool,

    /// Minimum keypoints per image required by the keypoint head
    pub min_keypoints_per_image: u32,
}

impl ModelConfig {
    /// The keypoint threshold actually in effect: zero unless the keypoint
    /// head is enabled.
    pub fn effective_min_keypoints(&self) -> u32 {
        if self.keypoint_on {
            self.min_keypoints_per_image
        } else {
            0
        }
    }
}

/// Prior output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "csv")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_min_keypoints_zero_when_keypoints_off() {
        let model = ModelConfig {
            keypoint_on: false,
            min_keypoints_per_image: 10,
            ..ModelConfig::default()
        };
        assert_eq!(model.effective_min_keypoints(), 0);
    }

    #[test]
    fn test_effective_min_keypoints_passes_through_when_on() {
        let model = ModelConfig {
            keypoint_on: true,
            min_keypoints_per_image: 10,
            ..ModelConfig::default()
        };
        assert_eq!(model.effective_min_keypoints(), 10);
    }
}
