//! Administration tools operating on a bot installation.

pub mod checker;
pub mod inventory;
pub mod issues;

pub use checker::{CHECKER_VERSION, CheckMode, Checker};
pub use inventory::{BotInventory, JsonInventory};
pub use issues::{GeneralIssueDetail, ParameterIssue};
