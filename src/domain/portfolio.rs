//! Portfolio templates and per-project visibility overrides.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SubmissionId, UserId};

/// Layout used to render a public portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioTemplate {
    /// Simple list view with project details.
    #[default]
    Minimal,
    /// Project cards in a grid.
    Grid,
    /// Large featured project layout.
    Showcase,
    /// Projects on a timeline.
    Timeline,
}

impl PortfolioTemplate {
    /// Every template, in catalog order.
    pub const ALL: [Self; 4] = [Self::Minimal, Self::Grid, Self::Showcase, Self::Timeline];

    /// Returns the template key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Grid => "grid",
            Self::Showcase => "showcase",
            Self::Timeline => "timeline",
        }
    }

    /// Returns the catalog entry describing this template.
    #[must_use]
    pub fn info(self) -> TemplateInfo {
        let (name, description, preview) = match self {
            Self::Minimal => (
                "Minimal",
                "Clean and simple portfolio layout",
                "Simple list view with project details",
            ),
            Self::Grid => (
                "Grid Gallery",
                "Project cards in a grid layout",
                "Projects displayed as cards",
            ),
            Self::Showcase => (
                "Showcase",
                "Large featured project layout",
                "Large project showcase view",
            ),
            Self::Timeline => (
                "Timeline",
                "Projects displayed as timeline",
                "Projects on a timeline",
            ),
        };
        TemplateInfo {
            id: self.key().to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            preview: Some(preview.to_string()),
            config: TemplateConfig {
                layout: self.key().to_string(),
            },
        }
    }
}

impl fmt::Display for PortfolioTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned for a template key outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown portfolio template: {0}")]
pub struct UnknownTemplate(pub String);

impl FromStr for PortfolioTemplate {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Rendering settings of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TemplateConfig {
    /// Layout key understood by the frontend.
    pub layout: String,
}

/// Catalog entry for a portfolio template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TemplateInfo {
    /// Template key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Short description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One-line preview text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Rendering settings.
    pub config: TemplateConfig,
}

impl TemplateInfo {
    /// Resolves a requested key to a catalog entry, or a generic entry
    /// whose layout is the key itself.
    #[must_use]
    pub fn resolve(key: &str) -> Self {
        match key.parse::<PortfolioTemplate>() {
            Ok(template) => template.info(),
            Err(_) => Self {
                id: key.to_string(),
                name: capitalize(key),
                description: None,
                preview: None,
                config: TemplateConfig {
                    layout: key.to_string(),
                },
            },
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A user's decision to show or hide one approved project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PortfolioVisibility {
    /// Portfolio owner.
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    /// Project the override applies to.
    #[schema(value_type = uuid::Uuid)]
    pub submission_id: SubmissionId,
    /// Whether the project is shown publicly.
    pub visible: bool,
}
