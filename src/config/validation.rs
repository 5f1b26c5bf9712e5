//! Validation of loaded configuration.

use anyhow::Result;

use super::defaults::AssessmentConfig;
use super::Config;

impl AssessmentConfig {
    /// Validate assessment configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("assessment.timeout_secs must be greater than 0");
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            anyhow::bail!(
                "assessment.endpoint must start with http:// or https://, got '{}'",
                self.endpoint
            );
        }
        if self.model.trim().is_empty() {
            anyhow::bail!("assessment.model must not be empty");
        }
        Ok(())
    }
}

impl Config {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.specs.as_os_str().is_empty() {
            anyhow::bail!("paths.specs must not be empty");
        }
        if self.paths.implementations.as_os_str().is_empty() {
            anyhow::bail!("paths.implementations must not be empty");
        }
        self.assessment.validate()
    }
}
