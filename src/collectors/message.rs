//! Mail message handed over by the mail-fetching layer.

use mail_parser::MessageParser;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// One entry of the message's `From` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Address part (`user@example.com`).
    pub email: String,
    /// Display name, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A fetched email, fully materialized in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// The original RFC 5322 payload, untouched.
    pub raw_email: Vec<u8>,
    pub subject: String,
    pub sent_from: Vec<Sender>,
    pub message_id: String,
}

impl MailMessage {
    /// Build a message from raw bytes, reading subject, senders and
    /// Message-ID from its headers.
    pub fn from_raw(raw_email: Vec<u8>) -> Result<Self, ExtractError> {
        let (subject, sent_from, message_id) = {
            let parsed = MessageParser::default()
                .parse(&raw_email)
                .ok_or(ExtractError::Unparseable)?;
            (
                parsed.subject().unwrap_or_default().to_string(),
                extract_senders(parsed.from()),
                parsed.message_id().unwrap_or_default().to_string(),
            )
        };

        Ok(Self {
            raw_email,
            subject,
            sent_from,
            message_id,
        })
    }

    /// Sender addresses joined with `,`, as stored in `extra.email_from`.
    pub fn sent_from_joined(&self) -> String {
        self.sent_from
            .iter()
            .map(|s| s.email.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Collect sender records from an optional mail_parser address field.
///
/// Entries without an address (bare display names) are skipped.
pub fn extract_senders(addr: Option<&mail_parser::Address>) -> Vec<Sender> {
    let Some(addr) = addr else {
        return Vec::new();
    };
    let to_sender = |a: &mail_parser::Addr| {
        a.address.as_ref().map(|email| Sender {
            email: email.to_string(),
            name: a.name.as_ref().map(|n| n.to_string()),
        })
    };
    match addr {
        mail_parser::Address::List(addrs) => addrs.iter().filter_map(to_sender).collect(),
        mail_parser::Address::Group(groups) => groups
            .iter()
            .flat_map(|g| g.addresses.iter().filter_map(to_sender))
            .collect(),
    }
}
