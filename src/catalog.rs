//! Content catalog - projects and skills shown on the page
//!
//! Records are loaded once at startup and never change. The only behavior
//! here is deciding which affordance each project's "Code" and "Live"
//! controls get, based on its access policy.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Who may follow a project's links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Code and live links are followed directly
    #[default]
    Public,
    /// Covered by a non-disclosure agreement; both controls open the notice
    NonDisclosure,
    /// Code is public, the live demo is not up yet
    LiveDemoUnavailable,
}

/// What a project control does when activated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "href", rename_all = "snake_case")]
pub enum Affordance {
    /// Plain link
    Link(String),
    /// Opens the protected-project dialog
    ProtectedNotice,
    /// Fires the "not available yet" acknowledgment
    UnavailableNotice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    /// Image path or URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "placeholder_link")]
    pub code_url: String,
    #[serde(default = "placeholder_link")]
    pub live_url: String,
    #[serde(default)]
    pub access: AccessPolicy,
}

fn placeholder_link() -> String {
    "#".to_string()
}

impl ProjectEntry {
    pub fn code_affordance(&self) -> Affordance {
        match self.access {
            AccessPolicy::NonDisclosure => Affordance::ProtectedNotice,
            AccessPolicy::Public | AccessPolicy::LiveDemoUnavailable => {
                Affordance::Link(self.code_url.clone())
            }
        }
    }

    pub fn live_affordance(&self) -> Affordance {
        match self.access {
            AccessPolicy::NonDisclosure => Affordance::ProtectedNotice,
            AccessPolicy::LiveDemoUnavailable => Affordance::UnavailableNotice,
            AccessPolicy::Public => Affordance::Link(self.live_url.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    /// Icon key for the presentation layer ("code", "palette", ...)
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Render data for one project card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub tech: &'a [String],
    pub image: Option<&'a str>,
    pub code: Affordance,
    pub live: Affordance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        tracing::debug!(
            projects = catalog.projects.len(),
            skills = catalog.skills.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Project cards in catalog order, with affordances resolved
    pub fn project_cards(&self) -> Vec<ProjectCard<'_>> {
        self.projects
            .iter()
            .map(|project| ProjectCard {
                title: &project.title,
                description: &project.description,
                tech: &project.tech,
                image: project.image.as_deref(),
                code: project.code_affordance(),
                live: project.live_affordance(),
            })
            .collect()
    }

    pub fn cards_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.project_cards())?)
    }
}
