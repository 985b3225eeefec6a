//! Output formatting for the computed prior.
//!
//! The prior is handed downstream as a serializable record; the writer
//! supports JSON (optionally pretty-printed) and CSV with one matrix row per
//! line.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::prior::CoOccurrencePrior;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object
    Json,
    /// Header line plus one matrix row per line
    Csv,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Serializable form of a computed prior.
///
/// The matrix is row-major, `(num_classes + 1)` rows of the same width; the
/// last row/column is the reserved slot and stays zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorRecord {
    /// Ordered class names defining the category index space
    pub class_names: Vec<String>,

    /// Number of classes `N` (matrix side is `N+1`)
    pub num_classes: usize,

    /// The normalized co-occurrence matrix, row-major
    pub matrix: Vec<Vec<f32>>,
}

impl From<&CoOccurrencePrior> for PriorRecord {
    fn from(prior: &CoOccurrencePrior) -> Self {
        Self {
            class_names: prior.class_names().to_vec(),
            num_classes: prior.num_classes(),
            matrix: prior.matrix().outer_iter().map(|row| row.to_vec()).collect(),
        }
    }
}

/// A writer that serializes a prior record to JSON or CSV.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write the record in the configured format.
    pub fn write(&mut self, record: &PriorRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, record)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::Csv => self.write_csv(record)?,
        }
        Ok(())
    }

    /// CSV layout: a header of row/column labels, then one line per matrix
    /// row, each prefixed with its row label. The reserved slot is labeled
    /// "reserved".
    fn write_csv(&mut self, record: &PriorRecord) -> io::Result<()> {
        let labels: Vec<&str> = record
            .class_names
            .iter()
            .map(|s| s.as_str())
            .chain(std::iter::once("reserved"))
            .collect();

        writeln!(self.writer, "class,{}", labels.join(","))?;
        for (label, row) in labels.iter().zip(&record.matrix) {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(self.writer, "{},{}", label, cells.join(","))?;
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Convenience function to serialize a record to a JSON string.
pub fn to_json(record: &PriorRecord, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(record)
    } else {
        serde_json::to_string(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Annotation, ImageRecord};

    fn sample_prior() -> CoOccurrencePrior {
        let records = vec![ImageRecord {
            image_id: 1,
            file_name: "a.jpg".to_string(),
            width: 10,
            height: 10,
            annotations: vec![Annotation::new(0), Annotation::new(1)],
            proposals: None,
        }];
        let names = vec!["person".to_string(), "dog".to_string()];
        CoOccurrencePrior::from_records(&records, &names)
    }

    #[test]
    fn test_record_shape_matches_prior() {
        let record = PriorRecord::from(&sample_prior());
        assert_eq!(record.num_classes, 2);
        assert_eq!(record.matrix.len(), 3);
        assert!(record.matrix.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn test_write_json_contains_names_and_matrix() {
        let record = PriorRecord::from(&sample_prior());
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write(&record).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"class_names\":[\"person\",\"dog\"]"));
        assert!(output.contains("\"num_classes\":2"));
        assert!(output.contains("\"matrix\""));
    }

    #[test]
    fn test_json_roundtrip() {
        let record = PriorRecord::from(&sample_prior());
        let json = to_json(&record, true).unwrap();
        let parsed: PriorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.class_names, record.class_names);
        assert_eq!(parsed.matrix, record.matrix);
    }

    #[test]
    fn test_write_csv_has_header_and_all_rows() {
        let record = PriorRecord::from(&sample_prior());
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Csv, false);
        writer.write(&record).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        // Header + N+1 matrix rows
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "class,person,dog,reserved");
        assert!(lines[1].starts_with("person,"));
        assert!(lines[3].starts_with("reserved,"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("CSV"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::parse("parquet"), None);
    }
}
