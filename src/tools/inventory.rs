//! Bot inventory: which bots are installed and what the configuration diff
//! found for them.
//!
//! The diff itself is computed elsewhere; the inventory only hands the
//! precomputed results to the checker.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::issues::GeneralIssueDetail;
use crate::error::CheckError;

/// Static description of an installed bot class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDetails {
    pub class_name: String,
    #[serde(default)]
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One configured instance of a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInstance {
    pub bot_id: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// An installed bot class with its running instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledBot {
    pub details: BotDetails,
    #[serde(default)]
    pub instances: Vec<BotInstance>,
}

/// Drift between a bot class's installed definition and its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotIssue {
    pub bot: BotDetails,
    pub issue: GeneralIssueDetail,
}

/// Drift between an instance's runtime parameters and its bot definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeIssue {
    pub bot: BotDetails,
    pub instance: BotInstance,
    #[serde(default)]
    pub issues: Vec<GeneralIssueDetail>,
}

/// A configured bot the installation does not recognize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrangeBot {
    pub instance: BotInstance,
    /// Class the instance claims to be, if one could be resolved.
    #[serde(default)]
    pub bot: Option<BotDetails>,
    pub reason: String,
    #[serde(default)]
    pub issues: Vec<BotIssue>,
}

/// Source of installed bots and their precomputed issues.
pub trait BotInventory {
    fn installed_bots(&self) -> Vec<InstalledBot>;

    /// Definition drift for the given bots.
    fn bot_issues(&self, bots: &[InstalledBot]) -> Vec<BotIssue>;

    /// Runtime parameter drift for the instances of the given bots.
    fn runtime_issues(&self, bots: &[InstalledBot]) -> Vec<RuntimeIssue>;

    fn strange_bots(&self) -> Vec<StrangeBot>;
}

/// Inventory snapshot loaded from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonInventory {
    #[serde(default)]
    pub installed_bots: Vec<InstalledBot>,
    #[serde(default)]
    pub bot_issues: Vec<BotIssue>,
    #[serde(default)]
    pub runtime_issues: Vec<RuntimeIssue>,
    #[serde(default)]
    pub strange_bots: Vec<StrangeBot>,
}

impl JsonInventory {
    pub fn from_json(json: &str) -> Result<Self, CheckError> {
        serde_json::from_str(json).map_err(|e| CheckError::Inventory {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let json = std::fs::read_to_string(path).map_err(|e| CheckError::Inventory {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let inventory: Self = serde_json::from_str(&json).map_err(|e| CheckError::Inventory {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            path = %path.display(),
            bots = inventory.installed_bots.len(),
            "Loaded bot inventory"
        );
        Ok(inventory)
    }
}

fn is_listed(bots: &[InstalledBot], class_name: &str) -> bool {
    bots.iter().any(|b| b.details.class_name == class_name)
}

impl BotInventory for JsonInventory {
    fn installed_bots(&self) -> Vec<InstalledBot> {
        self.installed_bots.clone()
    }

    fn bot_issues(&self, bots: &[InstalledBot]) -> Vec<BotIssue> {
        self.bot_issues
            .iter()
            .filter(|i| is_listed(bots, &i.bot.class_name))
            .cloned()
            .collect()
    }

    fn runtime_issues(&self, bots: &[InstalledBot]) -> Vec<RuntimeIssue> {
        self.runtime_issues
            .iter()
            .filter(|i| is_listed(bots, &i.bot.class_name))
            .cloned()
            .collect()
    }

    fn strange_bots(&self) -> Vec<StrangeBot> {
        self.strange_bots.clone()
    }
}
