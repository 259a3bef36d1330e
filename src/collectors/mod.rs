//! Collector bots and the types they exchange with the mail layer and the bus.

pub mod mail_part;
pub mod message;
pub mod report;
pub mod sink;

pub use mail_part::{ExtractedPart, MailPartCollector, extract_parts, split_body};
pub use message::{MailMessage, Sender};
pub use report::Report;
pub use sink::{JsonLinesSink, ReportSink, VecSink};
