//! Issue tree describing drift between a bot's reference configuration and
//! what is actually installed or running.

use serde::{Deserialize, Serialize};

/// Issues found at one level of a configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralIssueDetail {
    /// Keys present in the checked configuration but not in the reference.
    #[serde(default)]
    pub additional_keys: Vec<String>,
    /// Keys of the reference missing from the checked configuration.
    #[serde(default)]
    pub missing_keys: Vec<String>,
    #[serde(default)]
    pub different_values: Vec<ParameterIssue>,
    /// Free-form findings.
    #[serde(default)]
    pub bot_issues: Vec<String>,
}

/// A parameter whose value differs from the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterIssue {
    /// Scalar mismatch.
    Value {
        parameter_name: String,
        has_value: serde_json::Value,
        should_be: serde_json::Value,
    },
    /// Object-valued parameter whose sub-parameters have issues.
    Nested {
        parameter_name: String,
        detail: GeneralIssueDetail,
    },
}

impl ParameterIssue {
    pub fn parameter_name(&self) -> &str {
        match self {
            Self::Value { parameter_name, .. } | Self::Nested { parameter_name, .. } => {
                parameter_name
            }
        }
    }
}
