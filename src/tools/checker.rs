//! `check` tool: prints where installed or running bot configurations
//! drifted from their reference.
//!
//! Output order follows the issue tree exactly; it is the tool's only
//! contract with whoever reads it.

use std::io::Write;

use colored::Colorize;
use tracing::debug;

use super::inventory::{BotDetails, BotInstance, BotInventory};
use super::issues::{GeneralIssueDetail, ParameterIssue};
use crate::error::CheckError;

pub const CHECKER_VERSION: &str = "0.2";

const SEPARATOR: &str = "----------------------------------------";
const INDENT: &str = "    ";

/// What to check. Exactly one mode per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Installed bot definitions against the reference definitions.
    Bots,
    /// Runtime parameters against the installed definitions.
    Runtime,
    /// Configured bots that match no installed definition.
    Strange,
}

impl CheckMode {
    /// Resolve the mode from the `--bots`/`--runtime`/`--strange` flags.
    pub fn from_flags(bots: bool, runtime: bool, strange: bool) -> Result<Self, CheckError> {
        match (bots, runtime, strange) {
            (true, false, false) => Ok(Self::Bots),
            (false, true, false) => Ok(Self::Runtime),
            (false, false, true) => Ok(Self::Strange),
            _ => Err(CheckError::IncorrectArgument),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Paint {
    Red,
    Magenta,
    Yellow,
    LightYellow,
    BackgroundRed,
}

/// Renders inventory issues as indented, colorized text.
pub struct Checker<'a, I: BotInventory + ?Sized, W: Write> {
    inventory: &'a I,
    out: W,
    color: bool,
}

impl<'a, I: BotInventory + ?Sized, W: Write> Checker<'a, I, W> {
    pub fn new(inventory: &'a I, out: W) -> Self {
        Self {
            inventory,
            out,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn run(&mut self, mode: CheckMode, full: bool) -> Result<(), CheckError> {
        debug!(?mode, full, "Running check");
        match mode {
            CheckMode::Bots => self.check_bots(full)?,
            CheckMode::Runtime => self.check_runtime(full)?,
            CheckMode::Strange => self.check_strange(full)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn check_bots(&mut self, full: bool) -> std::io::Result<()> {
        let bots = self.inventory.installed_bots();
        if bots.is_empty() {
            return writeln!(self.out, "Not Bots found");
        }
        let issues = self.inventory.bot_issues(&bots);
        if issues.is_empty() {
            return writeln!(self.out, "No issue found");
        }

        for issue in &issues {
            self.print_bot_class(&issue.bot)?;
            if full {
                self.print_bot_details(&issue.bot)?;
            }
            self.print_issue(&issue.issue, 0, true)?;
        }
        Ok(())
    }

    fn check_runtime(&mut self, full: bool) -> std::io::Result<()> {
        let bots = self.inventory.installed_bots();
        if bots.is_empty() {
            return writeln!(self.out, "Not Bots found");
        }
        let issues = self.inventory.runtime_issues(&bots);
        if issues.is_empty() {
            return writeln!(self.out, "No issue found");
        }

        for issue in &issues {
            self.print_bot_class(&issue.bot)?;
            self.print_bot_id(&issue.instance)?;
            if full {
                self.print_bot_parameters(&issue.instance)?;
            }
            for sub_issue in &issue.issues {
                self.print_issue(sub_issue, 1, true)?;
            }
        }
        Ok(())
    }

    fn check_strange(&mut self, full: bool) -> std::io::Result<()> {
        if self.inventory.installed_bots().is_empty() {
            return writeln!(self.out, "Not Bots found");
        }
        let strange_bots = self.inventory.strange_bots();
        if strange_bots.is_empty() {
            return writeln!(self.out, "No issue found");
        }

        for strange_bot in &strange_bots {
            if let Some(bot) = &strange_bot.bot {
                self.print_bot_class(bot)?;
            }
            self.print_bot_id(&strange_bot.instance)?;
            let reason = self.paint(&strange_bot.reason, Paint::Red);
            writeln!(self.out, "Strange  : {reason}")?;
            if full {
                self.print_bot_parameters(&strange_bot.instance)?;
            }
            for issue in &strange_bot.issues {
                self.print_issue(&issue.issue, 1, true)?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Print one level of an issue tree at `depth` indentation levels.
    ///
    /// Depth 0 describes the default bot definitions; anything deeper
    /// describes the running configuration.
    pub fn print_issue(
        &mut self,
        issues: &GeneralIssueDetail,
        depth: usize,
        print_lines: bool,
    ) -> std::io::Result<()> {
        let subject = if depth > 0 {
            "Running Configuration"
        } else {
            "Default BOTS"
        };
        let indent = INDENT.repeat(depth);

        if print_lines {
            writeln!(self.out, "{SEPARATOR}")?;
        }
        if !issues.additional_keys.is_empty() {
            let keys = self.paint(&format_keys(&issues.additional_keys), Paint::Red);
            writeln!(self.out, "{indent}{subject} has more keys:   {keys}")?;
        }
        if !issues.missing_keys.is_empty() {
            let keys = self.paint(&format_keys(&issues.missing_keys), Paint::Magenta);
            writeln!(self.out, "{indent}{subject} is missing keys: {keys}")?;
        }
        if !issues.different_values.is_empty() {
            let params = if depth > 0 {
                "SubParameter(s)"
            } else {
                "Parameter(s)"
            };
            writeln!(self.out, "{indent}{subject} {params} with issues:")?;
            for different_value in &issues.different_values {
                self.print_parameter_issue(different_value, depth + 1)?;
            }
        }
        for item in &issues.bot_issues {
            let item = self.paint(item, Paint::BackgroundRed);
            writeln!(self.out, "{indent}{item}")?;
        }
        if print_lines {
            writeln!(self.out, "{SEPARATOR}")?;
        }
        writeln!(self.out)
    }

    fn print_parameter_issue(&mut self, issue: &ParameterIssue, depth: usize) -> std::io::Result<()> {
        let name = self.paint(issue.parameter_name(), Paint::Yellow);
        let base = format!("{}For Parameter: {name}", INDENT.repeat(depth));

        match issue {
            ParameterIssue::Nested { detail, .. } => {
                writeln!(self.out, "{base} are:")?;
                self.print_issue(detail, depth + 1, false)
            }
            ParameterIssue::Value {
                has_value,
                should_be,
                ..
            } => {
                let has = self.paint(&display_value(has_value), Paint::Red);
                let should = self.paint(&display_value(should_be), Paint::Magenta);
                writeln!(self.out, "{base} has value {has} but should be {should}")
            }
        }
    }

    fn print_bot_class(&mut self, bot: &BotDetails) -> std::io::Result<()> {
        let class_name = self.paint(&bot.class_name, Paint::LightYellow);
        writeln!(self.out, "BOT Class: {class_name}")
    }

    fn print_bot_id(&mut self, instance: &BotInstance) -> std::io::Result<()> {
        let bot_id = self.paint(&instance.bot_id, Paint::Yellow);
        writeln!(self.out, "BOT ID   : {bot_id}")
    }

    fn print_bot_details(&mut self, bot: &BotDetails) -> std::io::Result<()> {
        writeln!(self.out, "BOT Module: {}", bot.module)?;
        if let Some(description) = &bot.description {
            writeln!(self.out, "BOT Description: {description}")?;
        }
        Ok(())
    }

    fn print_bot_parameters(&mut self, instance: &BotInstance) -> std::io::Result<()> {
        let pretty =
            serde_json::to_string_pretty(&instance.parameters).map_err(std::io::Error::other)?;
        writeln!(self.out, "Parameters:")?;
        for line in pretty.lines() {
            writeln!(self.out, "{INDENT}{line}")?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.color {
            return text.to_string();
        }
        match paint {
            Paint::Red => text.red(),
            Paint::Magenta => text.magenta(),
            Paint::Yellow => text.yellow(),
            Paint::LightYellow => text.bright_yellow(),
            Paint::BackgroundRed => text.on_red(),
        }
        .to_string()
    }
}

fn format_keys(keys: &[String]) -> String {
    format!("[{}]", keys.join(", "))
}

/// Strings print bare; everything else in JSON notation.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tools::inventory::{BotIssue, InstalledBot, JsonInventory, RuntimeIssue, StrangeBot};

    fn details(class_name: &str) -> BotDetails {
        BotDetails {
            class_name: class_name.into(),
            module: "intelmq.bots.collectors.mail.collector_mail_part".into(),
            description: Some("Fetch mail parts".into()),
        }
    }

    fn instance(bot_id: &str) -> BotInstance {
        let mut parameters = serde_json::Map::new();
        parameters.insert("folder".into(), json!("INBOX"));
        BotInstance {
            bot_id: bot_id.into(),
            parameters,
        }
    }

    fn installed() -> Vec<InstalledBot> {
        vec![InstalledBot {
            details: details("MailPartCollectorBot"),
            instances: vec![instance("mail-part-collector")],
        }]
    }

    fn render(inventory: &JsonInventory, mode: CheckMode, full: bool) -> String {
        let mut checker = Checker::new(inventory, Vec::new()).with_color(false);
        checker.run(mode, full).unwrap();
        String::from_utf8(checker.into_inner()).unwrap()
    }

    // ── Mode flags ──────────────────────────────────────────────────

    #[test]
    fn mode_requires_exactly_one_flag() {
        assert_eq!(CheckMode::from_flags(true, false, false).unwrap(), CheckMode::Bots);
        assert_eq!(CheckMode::from_flags(false, true, false).unwrap(), CheckMode::Runtime);
        assert_eq!(CheckMode::from_flags(false, false, true).unwrap(), CheckMode::Strange);
        assert!(matches!(
            CheckMode::from_flags(false, false, false),
            Err(CheckError::IncorrectArgument)
        ));
        assert!(matches!(
            CheckMode::from_flags(true, true, false),
            Err(CheckError::IncorrectArgument)
        ));
    }

    // ── Empty results ───────────────────────────────────────────────

    #[test]
    fn no_bots_found_in_every_mode() {
        let inventory = JsonInventory::default();
        for mode in [CheckMode::Bots, CheckMode::Runtime, CheckMode::Strange] {
            assert_eq!(render(&inventory, mode, false), "Not Bots found\n");
        }
    }

    #[test]
    fn no_issue_found_when_bots_are_clean() {
        let inventory = JsonInventory {
            installed_bots: installed(),
            ..Default::default()
        };
        for mode in [CheckMode::Bots, CheckMode::Runtime, CheckMode::Strange] {
            assert_eq!(render(&inventory, mode, false), "No issue found\n");
        }
    }

    // ── Issue rendering ─────────────────────────────────────────────

    #[test]
    fn bots_missing_key_and_leaf_value() {
        let inventory = JsonInventory {
            installed_bots: installed(),
            bot_issues: vec![BotIssue {
                bot: details("MailPartCollectorBot"),
                issue: GeneralIssueDetail {
                    missing_keys: vec!["content_types".into()],
                    different_values: vec![ParameterIssue::Value {
                        parameter_name: "mail_port".into(),
                        has_value: json!(143),
                        should_be: json!(993),
                    }],
                    ..Default::default()
                },
            }],
            ..Default::default()
        };

        let expected = "\
BOT Class: MailPartCollectorBot
----------------------------------------
Default BOTS is missing keys: [content_types]
Default BOTS Parameter(s) with issues:
    For Parameter: mail_port has value 143 but should be 993
----------------------------------------

";
        assert_eq!(render(&inventory, CheckMode::Bots, false), expected);
    }

    #[test]
    fn nested_parameters_indent_per_level() {
        let inventory = JsonInventory::default();
        let mut checker = Checker::new(&inventory, Vec::new()).with_color(false);
        let tree = GeneralIssueDetail {
            additional_keys: vec!["extra".into()],
            different_values: vec![ParameterIssue::Nested {
                parameter_name: "http".into(),
                detail: GeneralIssueDetail {
                    different_values: vec![ParameterIssue::Value {
                        parameter_name: "timeout".into(),
                        has_value: json!("5"),
                        should_be: json!("30"),
                    }],
                    bot_issues: vec!["proxy unreachable".into()],
                    ..Default::default()
                },
            }],
            ..Default::default()
        };
        checker.print_issue(&tree, 0, false).unwrap();
        let out = String::from_utf8(checker.into_inner()).unwrap();

        let expected = "\
Default BOTS has more keys:   [extra]
Default BOTS Parameter(s) with issues:
    For Parameter: http are:
        Running Configuration SubParameter(s) with issues:
            For Parameter: timeout has value 5 but should be 30
        proxy unreachable


";
        assert_eq!(out, expected);
    }

    #[test]
    fn runtime_prints_bot_id_and_parameters_when_full() {
        let inventory = JsonInventory {
            installed_bots: installed(),
            runtime_issues: vec![RuntimeIssue {
                bot: details("MailPartCollectorBot"),
                instance: instance("mail-part-collector"),
                issues: vec![GeneralIssueDetail {
                    additional_keys: vec!["legacy".into()],
                    ..Default::default()
                }],
            }],
            ..Default::default()
        };

        let out = render(&inventory, CheckMode::Runtime, true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "BOT Class: MailPartCollectorBot");
        assert_eq!(lines[1], "BOT ID   : mail-part-collector");
        assert_eq!(lines[2], "Parameters:");
        assert!(out.contains("\"folder\": \"INBOX\""));
        assert!(out.contains("    Running Configuration has more keys:   [legacy]"));

        let brief = render(&inventory, CheckMode::Runtime, false);
        assert!(!brief.contains("Parameters:"));
    }

    #[test]
    fn strange_bots_print_reason() {
        let inventory = JsonInventory {
            installed_bots: installed(),
            strange_bots: vec![StrangeBot {
                instance: instance("old-collector"),
                bot: None,
                reason: "module not installed".into(),
                issues: vec![],
            }],
            ..Default::default()
        };

        let out = render(&inventory, CheckMode::Strange, false);
        assert_eq!(out, "BOT ID   : old-collector\nStrange  : module not installed\n\n");
    }

    #[test]
    fn colors_wrap_values() {
        colored::control::set_override(true);
        let inventory = JsonInventory::default();
        let mut checker = Checker::new(&inventory, Vec::new());
        let tree = GeneralIssueDetail {
            bot_issues: vec!["broken".into()],
            ..Default::default()
        };
        checker.print_issue(&tree, 0, false).unwrap();
        let out = String::from_utf8(checker.into_inner()).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("broken"));
    }
}
