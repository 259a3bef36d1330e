//! Outbound report published to the bus, one per matching MIME part.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::MailMessage;

/// A report in the flat, dotted-key layout the bus expects.
///
/// Reports are built once and never mutated afterwards; each matching part
/// gets its own value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Body bytes of the part, base64 on the wire.
    #[serde(with = "raw_base64")]
    pub raw: Vec<u8>,
    #[serde(rename = "feed.name", default, skip_serializing_if = "Option::is_none")]
    pub feed_name: Option<String>,
    #[serde(rename = "time.observation")]
    pub time_observation: DateTime<Utc>,
    #[serde(rename = "extra.email_subject")]
    pub email_subject: String,
    #[serde(rename = "extra.email_from")]
    pub email_from: String,
    #[serde(rename = "extra.email_message_id")]
    pub email_message_id: String,
    #[serde(rename = "extra.email_content_type")]
    pub email_content_type: String,
}

impl Report {
    /// Build the report for one part of `message`.
    pub fn for_part(
        message: &MailMessage,
        content_type: &str,
        raw: Vec<u8>,
        feed_name: Option<&str>,
    ) -> Self {
        Self {
            raw,
            feed_name: feed_name.map(str::to_string),
            time_observation: Utc::now(),
            email_subject: message.subject.clone(),
            email_from: message.sent_from_joined(),
            email_message_id: message.message_id.clone(),
            email_content_type: content_type.to_string(),
        }
    }
}

mod raw_base64 {
    use super::{Engine, STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(raw: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(raw))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
