//! Policy loading, validation, and generation.

mod generate;
mod types;
mod validation;

pub use generate::{generate_policy, mask_sample, GeneratedPolicy, SamplePreview};
pub use types::*;
pub use validation::preflight;

use crate::error::Result;
use crate::executor::ExecMode;
use std::path::Path;

impl Policy {
    /// Load a policy from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a policy from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize the policy to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the policy to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Validate the policy for the given run mode.
    pub fn preflight(&self, mode: ExecMode) -> Result<()> {
        validation::preflight(self, mode)
    }
}
