//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Content types extracted when the parameter is absent or unusable.
pub const DEFAULT_CONTENT_TYPES: [&str; 2] = ["text/plain", "text/html"];

/// Raw `content_types` parameter as it appears in the runtime configuration.
///
/// Operators write either a comma-separated string or a JSON list, and
/// older configurations carry a bare boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentTypesParam {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl ContentTypesParam {
    /// Interpret an environment value; `true`/`false` stay booleans.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim() {
            "true" => Self::Flag(true),
            "false" => Self::Flag(false),
            _ => Self::Text(value.to_string()),
        }
    }
}

/// Ordered allow-list of MIME content types eligible for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeFilter {
    types: Vec<String>,
}

impl ContentTypeFilter {
    /// Normalize a raw parameter into a filter.
    ///
    /// - string → split on `,`, each item trimmed, empty items dropped
    /// - list → kept as given
    /// - absent, `true`, `false`, empty string or empty list → default
    pub fn parse(raw: Option<&ContentTypesParam>) -> Self {
        let types: Vec<String> = match raw {
            None | Some(ContentTypesParam::Flag(_)) => Vec::new(),
            Some(ContentTypesParam::Text(text)) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            Some(ContentTypesParam::List(list)) => list.clone(),
        };

        if types.is_empty() {
            Self::default()
        } else {
            Self { types }
        }
    }

    /// Build a filter from explicit entries, e.g. from a CLI flag.
    pub fn from_list<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::parse(Some(&ContentTypesParam::List(
            types.into_iter().map(Into::into).collect(),
        )))
    }

    /// MIME types compare case-insensitively.
    pub fn matches(&self, content_type: &str) -> bool {
        self.types
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(content_type))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.types
    }
}

impl Default for ContentTypeFilter {
    fn default() -> Self {
        Self {
            types: DEFAULT_CONTENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Mail part collector parameters, built from the bot's runtime JSON or
/// from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailPartParams {
    /// Accepted content types (see [`ContentTypeFilter::parse`]).
    #[serde(default)]
    pub content_types: Option<ContentTypesParam>,
    /// Value copied into `feed.name` of every report.
    #[serde(default)]
    pub feed_name: Option<String>,
}

impl MailPartParams {
    /// Parse the `parameters` object of a runtime configuration entry.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load parameters from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build parameters from `MAIL_PART_CONTENT_TYPES` and `MAIL_PART_FEED_NAME`.
    pub fn from_env() -> Self {
        let content_types = std::env::var("MAIL_PART_CONTENT_TYPES")
            .ok()
            .map(|v| ContentTypesParam::from_env_value(&v));
        let feed_name = std::env::var("MAIL_PART_FEED_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            content_types,
            feed_name,
        }
    }

    pub fn content_type_filter(&self) -> ContentTypeFilter {
        ContentTypeFilter::parse(self.content_types.as_ref())
    }
}
