//! Mail part collector: publishes the MIME parts of a message whose content
//! type is in the configured allow-list, one report per part.
//!
//! Part bodies are sliced out of the original bytes, so binary payloads
//! reach the bus exactly as they were transmitted (transfer encoding
//! included).

use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::{debug, info, warn};

use super::message::MailMessage;
use super::report::Report;
use super::sink::ReportSink;
use crate::config::{ContentTypeFilter, MailPartParams};
use crate::error::ExtractError;

/// Content type of a part without a usable `Content-Type` header (RFC 2045).
const DEFAULT_PART_CONTENT_TYPE: &str = "text/plain";

/// A part that passed the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPart {
    pub content_type: String,
    /// Everything after the part's header block.
    pub body: Vec<u8>,
}

/// Select the parts of `raw` whose content type is in `filter`.
///
/// Multipart messages are walked depth-first, containers and embedded
/// messages included. A non-multipart message counts as a single part.
///
/// mail-parser drops a multipart entry that has headers but no empty line
/// after them (`--b\r\nContent-Type: text/plain\r\n--b--`), so such an
/// entry is never seen here and yields no report rather than an error.
pub fn extract_parts(
    raw: &[u8],
    filter: &ContentTypeFilter,
) -> Result<Vec<ExtractedPart>, ExtractError> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or(ExtractError::Unparseable)?;

    let mut found = Vec::new();
    if is_multipart(&message) {
        walk(&message, message.raw_message(), filter, &mut found)?;
    } else {
        let content_type = part_content_type(message.parts.first());
        if filter.matches(&content_type) {
            let body = split_body(message.raw_message()).ok_or_else(|| {
                ExtractError::MissingSeparator {
                    index: 0,
                    content_type: content_type.clone(),
                }
            })?;
            found.push(ExtractedPart {
                content_type,
                body: body.to_vec(),
            });
        }
    }
    Ok(found)
}

/// `raw` is the buffer the part offsets of `message` point into.
fn walk(
    message: &Message<'_>,
    raw: &[u8],
    filter: &ContentTypeFilter,
    found: &mut Vec<ExtractedPart>,
) -> Result<(), ExtractError> {
    for (index, part) in message.parts.iter().enumerate() {
        let content_type = part_content_type(Some(part));
        if filter.matches(&content_type) {
            let start = part.raw_header_offset() as usize;
            let end = part.raw_end_offset() as usize;
            let serialized = raw
                .get(start..end)
                .ok_or(ExtractError::OffsetOutOfRange { index })?;
            let body = split_body(serialized).ok_or_else(|| ExtractError::MissingSeparator {
                index,
                content_type: content_type.clone(),
            })?;
            debug!(index, content_type = %content_type, bytes = body.len(), "Part matched");
            found.push(ExtractedPart {
                content_type,
                body: body.to_vec(),
            });
        }

        if let PartType::Message(nested) = &part.body {
            walk(nested, offset_buffer(raw, nested), filter, found)?;
        }
    }
    Ok(())
}

/// Buffer holding the part offsets of an embedded message.
///
/// An embedded message parsed in place borrows the enclosing buffer and its
/// offsets count from the start of that buffer. One that had to be decoded
/// first (e.g. a base64 `message/rfc822`) owns its bytes and counts from
/// their start.
fn offset_buffer<'a>(outer: &'a [u8], nested: &'a Message<'_>) -> &'a [u8] {
    let inner = nested.raw_message();
    if outer.as_ptr_range().contains(&inner.as_ptr()) {
        outer
    } else {
        inner
    }
}

fn is_multipart(message: &Message<'_>) -> bool {
    matches!(
        message.parts.first().map(|p| &p.body),
        Some(PartType::Multipart(_))
    )
}

/// `type/subtype` in lowercase, falling back to `text/plain` when the
/// header is missing or has no subtype.
fn part_content_type(part: Option<&MessagePart<'_>>) -> String {
    part.and_then(|p| p.content_type())
        .and_then(|ct| ct.subtype().map(|sub| format!("{}/{}", ct.ctype(), sub)))
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_PART_CONTENT_TYPE.to_string())
}

/// Return the bytes after the first empty line of a serialized part.
///
/// Both `\n` and `\r\n` line endings are recognized. A part that starts
/// with an empty line has no headers and its body starts right after it.
/// `None` means the part has no header/body separator at all. Parts that
/// mail-parser already discarded for lacking one never reach this point
/// (see [`extract_parts`]).
pub fn split_body(serialized: &[u8]) -> Option<&[u8]> {
    let mut line_start = 0;
    loop {
        let rest = &serialized[line_start..];
        if let Some(body) = rest.strip_prefix(b"\r\n") {
            return Some(body);
        }
        if let Some(body) = rest.strip_prefix(b"\n") {
            return Some(body);
        }
        let newline = rest.iter().position(|&b| b == b'\n')?;
        line_start += newline + 1;
    }
}

/// Collector bot publishing matching MIME parts.
#[derive(Debug, Clone)]
pub struct MailPartCollector {
    filter: ContentTypeFilter,
    feed_name: Option<String>,
}

impl MailPartCollector {
    pub fn new(params: &MailPartParams) -> Self {
        Self {
            filter: params.content_type_filter(),
            feed_name: params.feed_name.clone(),
        }
    }

    pub fn with_filter(filter: ContentTypeFilter) -> Self {
        Self {
            filter,
            feed_name: None,
        }
    }

    pub fn filter(&self) -> &ContentTypeFilter {
        &self.filter
    }

    /// Build one report per matching part. An empty vec means nothing matched.
    pub fn process(&self, message: &MailMessage) -> Result<Vec<Report>, ExtractError> {
        let parts = extract_parts(&message.raw_email, &self.filter)?;
        Ok(parts
            .into_iter()
            .map(|part| {
                Report::for_part(
                    message,
                    &part.content_type,
                    part.body,
                    self.feed_name.as_deref(),
                )
            })
            .collect())
    }

    /// Process a message and hand every report to `sink`.
    ///
    /// Returns whether any part matched, so the mail layer can decide how
    /// to treat the message.
    pub fn process_message(
        &self,
        message: &MailMessage,
        sink: &mut dyn ReportSink,
    ) -> crate::error::Result<bool> {
        let reports = self.process(message)?;

        for report in &reports {
            sink.send(report)?;
        }

        if reports.is_empty() {
            warn!(
                message_id = %message.message_id,
                accepted = ?self.filter.as_slice(),
                "No matching part found in message"
            );
            return Ok(false);
        }

        info!(
            message_id = %message.message_id,
            reports = reports.len(),
            "Sent mail part reports"
        );
        Ok(true)
    }
}
