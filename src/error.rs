//! Error types for portfolio navigation setup

use thiserror::Error;

/// Result type for construction-time operations
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Errors raised while building the navigation core.
///
/// Runtime commands (navigation, visibility events, modal transitions) never
/// fail; they log and carry on. Only configuration and catalog loading can
/// produce one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// The section list was empty
    #[error("Section registry must contain at least one section")]
    EmptyRegistry,

    /// The same section id appeared twice
    #[error("Duplicate section id: {0}")]
    DuplicateSection(String),

    /// A section id was blank or contained whitespace
    #[error("Invalid section id: {0:?}")]
    InvalidSectionId(String),

    /// Threshold outside the closed unit interval
    #[error("Intersection threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// Malformed JSON input
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The platform refused to create or attach an observer
    #[error("Platform error: {0}")]
    Platform(String),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PortfolioError::DuplicateSection("about".into()).to_string(),
            "Duplicate section id: about"
        );
        assert!(PortfolioError::InvalidThreshold(1.5)
            .to_string()
            .contains("1.5"));
    }

    #[test]
    fn test_from_serde_error() {
        let err: PortfolioError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, PortfolioError::Serialization(_)));
    }
}
