//! Section Registry - the fixed, ordered set of navigable sections
//!
//! The first registered section is the default active section (the "home"
//! entry). The set is fixed once built; the state machine keys its
//! visibility map by exactly these ids.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{PortfolioError, Result};

/// Sections of the portfolio page, in document order.
pub const DEFAULT_SECTIONS: [&str; 4] = ["home", "about", "projects", "contact"];

// =============================================================================
// SectionId
// =============================================================================

/// Opaque identifier of a page section.
///
/// Doubles as the DOM anchor id the Scroll Commander and the browser
/// observer look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label for navigation items ("projects" -> "Projects")
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// SectionRegistry
// =============================================================================

/// Ordered, duplicate-free, non-empty list of sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<SectionId>,
}

impl SectionRegistry {
    /// Build a registry from ids in document order.
    ///
    /// Rejects an empty list, duplicates, and ids that could not be used as
    /// a DOM element id (blank or containing whitespace).
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut sections = Vec::new();

        for id in ids {
            let id = id.into();
            if id.is_empty() || id.chars().any(char::is_whitespace) {
                return Err(PortfolioError::InvalidSectionId(id));
            }
            if !seen.insert(id.clone()) {
                return Err(PortfolioError::DuplicateSection(id));
            }
            sections.push(SectionId(id));
        }

        if sections.is_empty() {
            return Err(PortfolioError::EmptyRegistry);
        }

        Ok(Self { sections })
    }

    /// The section that is active before any visibility event arrives
    pub fn default_section(&self) -> &SectionId {
        &self.sections[0]
    }

    /// Look up the registered id matching `raw`
    pub fn resolve(&self, raw: &str) -> Option<&SectionId> {
        self.sections.iter().find(|s| s.as_str() == raw)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.resolve(raw).is_some()
    }

    /// Document-order index of a section
    pub fn position(&self, raw: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.as_str() == raw)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionId> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false: a registry cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self {
            sections: DEFAULT_SECTIONS
                .iter()
                .map(|s| SectionId((*s).to_string()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a SectionId;
    type IntoIter = std::slice::Iter<'a, SectionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
