//! intelmq extras: a mail part collector and a bot configuration checker.

pub mod collectors;
pub mod config;
pub mod error;
pub mod tools;
