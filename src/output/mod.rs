//! Output module: turning a metadata record into a delivered report
//!
//! This module handles:
//! - Formatting metadata into sanitized, length-bounded display fields
//! - Building the webhook message within the destination's limits
//! - Delivering it to a webhook, or printing it as markdown

mod formatter;
pub mod limits;
mod markdown;
mod payload;
mod traits;
mod webhook;

pub use formatter::{
    escape_markdown, format_list, format_metadata, truncate, DisplayField, PLACEHOLDER,
    SAMPLE_SIZE, TRUNCATION_MARKER,
};
pub use markdown::{format_markdown_report, ConsoleReporter};
pub use payload::{
    build_payload, enforce_limits, status_text, AllowedMentions, Embed, EmbedFooter,
    WebhookPayload,
};
pub use traits::Reporter;
pub use webhook::WebhookReporter;
