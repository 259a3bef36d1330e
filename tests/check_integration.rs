//! Integration tests for the `check` tool: inventory snapshot on disk →
//! checker output.

use std::io::Write;

use intelmq_extras::error::CheckError;
use intelmq_extras::tools::{CheckMode, Checker, JsonInventory};

const INVENTORY: &str = r#"{
    "installed_bots": [
        {
            "details": {"class_name": "MailPartCollectorBot", "module": "intelmq.bots.collectors.mail.collector_mail_part"},
            "instances": [{"bot_id": "mail-part-collector", "parameters": {"content_types": "text/plain"}}]
        }
    ],
    "bot_issues": [
        {
            "bot": {"class_name": "MailPartCollectorBot"},
            "issue": {
                "missing_keys": ["content_types"],
                "different_values": [
                    {"kind": "value", "parameter_name": "mail_ssl", "has_value": false, "should_be": true}
                ]
            }
        }
    ],
    "runtime_issues": [
        {
            "bot": {"class_name": "MailPartCollectorBot"},
            "instance": {"bot_id": "mail-part-collector"},
            "issues": [
                {"different_values": [
                    {"kind": "nested", "parameter_name": "http", "detail": {"missing_keys": ["timeout"]}}
                ]}
            ]
        }
    ]
}"#;

fn write_inventory(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn run(inventory: &JsonInventory, mode: CheckMode) -> String {
    let mut checker = Checker::new(inventory, Vec::new()).with_color(false);
    checker.run(mode, false).unwrap();
    String::from_utf8(checker.into_inner()).unwrap()
}

#[test]
fn bots_mode_from_file() {
    let file = write_inventory(INVENTORY);
    let inventory = JsonInventory::load(file.path()).unwrap();

    let out = run(&inventory, CheckMode::Bots);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "BOT Class: MailPartCollectorBot",
            "----------------------------------------",
            "Default BOTS is missing keys: [content_types]",
            "Default BOTS Parameter(s) with issues:",
            "    For Parameter: mail_ssl has value false but should be true",
            "----------------------------------------",
            "",
        ]
    );
}

#[test]
fn runtime_mode_renders_nested_parameters() {
    let file = write_inventory(INVENTORY);
    let inventory = JsonInventory::load(file.path()).unwrap();

    let out = run(&inventory, CheckMode::Runtime);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "BOT Class: MailPartCollectorBot");
    assert_eq!(lines[1], "BOT ID   : mail-part-collector");
    assert_eq!(lines[2], "----------------------------------------");
    assert_eq!(lines[3], "    Running Configuration SubParameter(s) with issues:");
    assert_eq!(lines[4], "        For Parameter: http are:");
    assert_eq!(
        lines[5],
        "            Running Configuration is missing keys: [timeout]"
    );
}

#[test]
fn strange_mode_without_strange_bots() {
    let file = write_inventory(INVENTORY);
    let inventory = JsonInventory::load(file.path()).unwrap();
    assert_eq!(run(&inventory, CheckMode::Strange), "No issue found\n");
}

#[test]
fn empty_inventory_reports_no_bots() {
    let file = write_inventory("{}");
    let inventory = JsonInventory::load(file.path()).unwrap();
    assert_eq!(run(&inventory, CheckMode::Runtime), "Not Bots found\n");
}

#[test]
fn missing_mode_fails_before_output() {
    assert!(matches!(
        CheckMode::from_flags(false, false, false),
        Err(CheckError::IncorrectArgument)
    ));
}

#[test]
fn malformed_inventory_is_rejected() {
    let file = write_inventory("{\"installed_bots\": 3}");
    let err = JsonInventory::load(file.path()).unwrap_err();
    assert!(matches!(err, CheckError::Inventory { .. }));
}
