//! Configuration validation with cross-field checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values and cross-field consistency.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"csv\", got \"{}\"",
                self.output.format
            )));
        }
        if self.model.load_proposals
            && self.datasets.proposal_files_train.len() != self.datasets.train.len()
        {
            return Err(ConfigError::ValidationError(format!(
                "model.load_proposals requires one proposal file per training dataset \
                 ({} datasets, {} proposal files)",
                self.datasets.train.len(),
                self.datasets.proposal_files_train.len()
            )));
        }
        Ok(())
    }
}
