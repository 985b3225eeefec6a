//! The class co-occurrence tally.
//!
//! Counts, for every ordered pair of distinct categories appearing in the
//! same image, how often that pair co-occurs across a merged record list,
//! then normalizes each row by how often its category appears at all. The
//! resulting matrix is the attention prior handed to a downstream
//! relation-detection model.

use ndarray::{Array1, Array2};

use crate::dataset::{merge_datasets, Dataset, MergeOptions};
use crate::error::{DatasetError, DatasetResult};
use crate::types::ImageRecord;

/// A normalized class co-occurrence matrix.
///
/// The matrix is `(N+1)×(N+1)` for `N` classes. Entry `[i, j]` (for
/// `i != j`, both below `N`) is the fraction of images containing class `i`
/// that also contain class `j`. Row and column `N` are reserved for a class
/// outside the label space; the tally never writes them and they stay zero.
#[derive(Debug, Clone)]
pub struct CoOccurrencePrior {
    matrix: Array2<f32>,
    appearances: Array1<f32>,
    class_names: Vec<String>,
}

impl CoOccurrencePrior {
    /// Tally co-occurrences over a merged record list.
    ///
    /// Per image, the distinct non-crowd categories are collected; every
    /// ordered cross pair increments its matrix cell and each present
    /// category increments its appearance count once. Rows of categories
    /// that never appear are left all-zero rather than divided by zero.
    ///
    /// A `category_id` outside `[0, class_names.len())` is a caller bug and
    /// panics at index time.
    pub fn from_records(records: &[ImageRecord], class_names: &[String]) -> Self {
        let num_classes = class_names.len();
        let mut appearances = Array1::<f32>::zeros(num_classes);
        let mut matrix = Array2::<f32>::zeros((num_classes + 1, num_classes + 1));

        for record in records {
            let present = record.present_categories();
            for &c1 in &present {
                for &c2 in &present {
                    if c1 == c2 {
                        continue;
                    }
                    matrix[[c1, c2]] += 1.0;
                }
                appearances[c1] += 1.0;
            }
        }

        for c in 0..num_classes {
            let count = appearances[c];
            if count != 0.0 {
                matrix.row_mut(c).mapv_inplace(|v| v / count);
            }
        }

        tracing::debug!(
            "Tallied co-occurrence prior: {} classes over {} images",
            num_classes,
            records.len(),
        );

        Self {
            matrix,
            appearances,
            class_names: class_names.to_vec(),
        }
    }

    /// Merge datasets and tally in one step.
    ///
    /// Class names are taken from the first dataset, which must carry them.
    pub fn from_datasets(datasets: Vec<Dataset>, options: &MergeOptions) -> DatasetResult<Self> {
        let first = datasets.first().ok_or(DatasetError::NoDatasets)?;
        let class_names =
            first
                .class_names
                .clone()
                .ok_or_else(|| DatasetError::MissingClassNames {
                    name: first.name.clone(),
                })?;
        let records = merge_datasets(datasets, options)?;
        Ok(Self::from_records(&records, &class_names))
    }

    /// The normalized `(N+1)×(N+1)` matrix.
    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    /// Number of classes `N` (matrix side length minus the reserved slot).
    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Per-class image appearance counts, length `N`.
    pub fn appearances(&self) -> &Array1<f32> {
        &self.appearances
    }

    /// Ordered class names defining the category index space.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Annotation;
    use approx::assert_relative_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class_{i}")).collect()
    }

    fn image(image_id: i64, annotations: Vec<Annotation>) -> ImageRecord {
        ImageRecord {
            image_id,
            file_name: format!("{image_id}.jpg"),
            width: 640,
            height: 480,
            annotations,
            proposals: None,
        }
    }

    fn image_with(image_id: i64, categories: &[usize]) -> ImageRecord {
        image(
            image_id,
            categories.iter().map(|&c| Annotation::new(c)).collect(),
        )
    }

    #[test]
    fn test_matrix_shape_and_nonnegativity() {
        let records = vec![image_with(1, &[0, 2]), image_with(2, &[1])];
        let prior = CoOccurrencePrior::from_records(&records, &names(4));

        assert_eq!(prior.matrix().dim(), (5, 5));
        assert!(prior.matrix().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_single_image_triple_all_pairs_one() {
        let records = vec![image_with(1, &[1, 2, 3])];
        let prior = CoOccurrencePrior::from_records(&records, &names(5));
        let m = prior.matrix();

        for &c in &[1usize, 2, 3] {
            assert_relative_eq!(prior.appearances()[c], 1.0);
        }
        for &c1 in &[1usize, 2, 3] {
            for &c2 in &[1usize, 2, 3] {
                if c1 != c2 {
                    assert_relative_eq!(m[[c1, c2]], 1.0);
                }
            }
        }
    }

    #[test]
    fn test_diagonal_is_always_zero() {
        let records = vec![
            image_with(1, &[0, 1, 2]),
            image_with(2, &[0, 0, 1]),
            image_with(3, &[2]),
        ];
        let prior = CoOccurrencePrior::from_records(&records, &names(3));

        for c in 0..4 {
            assert_eq!(prior.matrix()[[c, c]], 0.0);
        }
    }

    #[test]
    fn test_no_cooccurrence_means_zero_off_diagonal() {
        let records = vec![image_with(1, &[0]), image_with(2, &[1]), image_with(3, &[2])];
        let prior = CoOccurrencePrior::from_records(&records, &names(3));

        assert!(prior.matrix().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_absent_class_row_stays_zero() {
        let records = vec![image_with(1, &[0, 1])];
        let prior = CoOccurrencePrior::from_records(&records, &names(4));

        assert_eq!(prior.appearances()[3], 0.0);
        assert!(prior.matrix().row(3).iter().all(|&v| v == 0.0));
        assert!(prior.matrix().column(3).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_reserved_row_and_column_stay_zero() {
        let records = vec![image_with(1, &[0, 1, 2]), image_with(2, &[0, 2])];
        let prior = CoOccurrencePrior::from_records(&records, &names(3));

        assert!(prior.matrix().row(3).iter().all(|&v| v == 0.0));
        assert!(prior.matrix().column(3).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_duplicate_instances_count_once_per_image() {
        // Two persons and a dog in one image: person appears once, and the
        // person->dog cell gets a single increment.
        let records = vec![image_with(1, &[0, 0, 1])];
        let prior = CoOccurrencePrior::from_records(&records, &names(2));

        assert_relative_eq!(prior.appearances()[0], 1.0);
        assert_relative_eq!(prior.matrix()[[0, 1]], 1.0);
    }

    #[test]
    fn test_crowd_instances_do_not_contribute() {
        let records = vec![image(
            1,
            vec![Annotation::new(0), Annotation::new(1), Annotation::crowd(5)],
        )];
        let prior = CoOccurrencePrior::from_records(&records, &names(6));

        assert_eq!(prior.appearances()[5], 0.0);
        assert!(prior.matrix().row(5).iter().all(|&v| v == 0.0));
        assert!(prior.matrix().column(5).iter().all(|&v| v == 0.0));
        assert_relative_eq!(prior.matrix()[[0, 1]], 1.0);
    }

    #[test]
    fn test_normalization_is_conditional_on_row_class() {
        // Class 0 appears in 4 images, co-occurs with class 1 in 1 of them.
        // Class 1 appears in 2 images, co-occurs with class 0 in 1 of them.
        let records = vec![
            image_with(1, &[0, 1]),
            image_with(2, &[0]),
            image_with(3, &[0]),
            image_with(4, &[0]),
            image_with(5, &[1]),
        ];
        let prior = CoOccurrencePrior::from_records(&records, &names(2));

        assert_relative_eq!(prior.matrix()[[0, 1]], 0.25);
        assert_relative_eq!(prior.matrix()[[1, 0]], 0.5);
    }

    #[test]
    fn test_tally_is_deterministic() {
        let records = vec![
            image_with(1, &[0, 1, 2]),
            image_with(2, &[2, 3]),
            image_with(3, &[1, 3]),
        ];
        let a = CoOccurrencePrior::from_records(&records, &names(4));
        let b = CoOccurrencePrior::from_records(&records, &names(4));

        assert_eq!(a.matrix(), b.matrix());
        assert_eq!(a.appearances(), b.appearances());
    }

    #[test]
    fn test_empty_record_list_yields_zero_matrix() {
        let prior = CoOccurrencePrior::from_records(&[], &names(3));
        assert_eq!(prior.matrix().dim(), (4, 4));
        assert!(prior.matrix().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_datasets_uses_first_dataset_names() {
        let dataset = Dataset::new(
            "train",
            vec![image_with(1, &[0, 1])],
            Some(vec!["person".to_string(), "dog".to_string()]),
        );
        let prior =
            CoOccurrencePrior::from_datasets(vec![dataset], &MergeOptions::default()).unwrap();

        assert_eq!(prior.class_names(), ["person", "dog"]);
        assert_eq!(prior.num_classes(), 2);
        assert_relative_eq!(prior.matrix()[[0, 1]], 1.0);
    }

    #[test]
    fn test_from_datasets_requires_class_names() {
        let dataset = Dataset::new("train", vec![image_with(1, &[])], None);
        let err =
            CoOccurrencePrior::from_datasets(vec![dataset], &MergeOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingClassNames { .. }));
    }
}
