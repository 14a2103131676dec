//! Navigation configuration

use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, Result};
use crate::registry::{SectionRegistry, DEFAULT_SECTIONS};

/// Fraction of a section that must be on screen to count as visible
pub const DEFAULT_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Section ids in document order; the first is the default active one
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Intersection threshold ratio in [0, 1]
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            threshold: default_threshold(),
        }
    }
}

fn default_sections() -> Vec<String> {
    DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl NavigationConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: NavigationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections = sections.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PortfolioError::InvalidThreshold(self.threshold));
        }
        self.registry().map(|_| ())
    }

    /// Build the section registry described by this config
    pub fn registry(&self) -> Result<SectionRegistry> {
        SectionRegistry::new(self.sections.iter().cloned())
    }
}
