//! Webhook message schema and size enforcement
//!
//! The message carries exactly one embed. Run-level fields (status, timing,
//! server headers) come first, followed by the formatted metadata fields.
//! When the embed would exceed the destination limits, long values are
//! shrunk and then trailing fields dropped, never the status or link counts.

use crate::config::WebhookConfig;
use crate::output::formatter::{escape_markdown, truncate, DisplayField};
use crate::output::limits::{EMBED_TITLE_LIMIT, EMBED_TOTAL_LIMIT, FOOTER_TEXT_LIMIT, MAX_FIELDS};
use crate::scrape::RunInfo;
use crate::url::extract_domain;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;

const COLOR_SUCCESS: u32 = 0x2ecc71;
const COLOR_REDIRECT: u32 = 0xf1c40f;
const COLOR_ERROR: u32 = 0xe74c3c;

/// Top-level execute-webhook body
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub allowed_mentions: AllowedMentions,
    pub embeds: Vec<Embed>,
}

/// Mention parsing switched off so page text can never ping anyone
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<DisplayField>,
    pub timestamp: String,
    pub footer: EmbedFooter,
}

impl Embed {
    /// Characters counted against [`EMBED_TOTAL_LIMIT`]
    pub fn char_len(&self) -> usize {
        self.title.chars().count()
            + self.footer.text.chars().count()
            + self.fields.iter().map(DisplayField::char_len).sum::<usize>()
    }

    pub fn field(&self, name: &str) -> Option<&DisplayField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// "200 OK", "404 Not Found", or just the code for unknown statuses
pub fn status_text(status_code: u16) -> String {
    let reason = StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason());

    match reason {
        Some(reason) => format!("{} {}", status_code, reason),
        None => status_code.to_string(),
    }
}

fn status_color(run: &RunInfo) -> u32 {
    if run.is_success() {
        COLOR_SUCCESS
    } else if (300..400).contains(&run.status_code) {
        COLOR_REDIRECT
    } else {
        COLOR_ERROR
    }
}

/// Fields describing the fetch itself
fn run_fields(run: &RunInfo) -> Vec<DisplayField> {
    let mut fields = vec![
        DisplayField::new("Status", status_text(run.status_code), true),
        DisplayField::new(
            "Load Time (s)",
            format!("{:.2}", run.elapsed_millis as f64 / 1000.0),
            true,
        ),
    ];

    if let Some(server) = &run.server {
        fields.push(DisplayField::new("Server", escape_markdown(server), true));
    }
    if let Some(length) = &run.content_length {
        fields.push(DisplayField::new(
            "Content Length (bytes)",
            escape_markdown(length),
            true,
        ));
    }
    if let Some(modified) = &run.last_modified {
        fields.push(DisplayField::new(
            "Last-Modified",
            escape_markdown(modified),
            false,
        ));
    }
    if run.was_redirected() {
        fields.push(DisplayField::new("Final URL", run.final_url.as_str(), false));
    }

    fields
}

/// Fields that survive size enforcement no matter what
const PINNED_FIELDS: &[&str] = &["Status", "Internal Links", "External Links"];

/// Shortest value a field is shrunk to before it is dropped instead
const MIN_SHRUNK_VALUE: usize = 100;

fn is_pinned(field: &DisplayField) -> bool {
    PINNED_FIELDS.contains(&field.name.as_str())
}

/// Removes the last field that is not pinned; false when none is left
fn drop_last_unpinned(embed: &mut Embed) -> bool {
    match embed.fields.iter().rposition(|f| !is_pinned(f)) {
        Some(index) => {
            let dropped = embed.fields.remove(index);
            tracing::warn!(
                "Dropping field '{}' to stay within embed limits",
                dropped.name
            );
            true
        }
        None => false,
    }
}

/// Fits the embed within the field count and total size limits
///
/// Pinned fields (status and link counts) are never removed. Over the total
/// size, the longest unpinned value is shrunk first, later fields before
/// earlier ones on ties; fields are dropped from the end only once every
/// unpinned value is down to [`MIN_SHRUNK_VALUE`].
pub fn enforce_limits(embed: &mut Embed) {
    while embed.fields.len() > MAX_FIELDS {
        if !drop_last_unpinned(embed) {
            break;
        }
    }

    while embed.char_len() > EMBED_TOTAL_LIMIT {
        let excess = embed.char_len() - EMBED_TOTAL_LIMIT;

        let longest = embed
            .fields
            .iter_mut()
            .filter(|f| !is_pinned(f))
            .filter(|f| f.value.chars().count() > MIN_SHRUNK_VALUE)
            .max_by_key(|f| f.value.chars().count());

        match longest {
            Some(field) => {
                let current = field.value.chars().count();
                let target = current.saturating_sub(excess).max(MIN_SHRUNK_VALUE);
                tracing::warn!(
                    "Shrinking field '{}' from {} to {} characters to stay within {}",
                    field.name,
                    current,
                    target,
                    EMBED_TOTAL_LIMIT
                );
                field.value = truncate(&field.value, target);
            }
            None => {
                if !drop_last_unpinned(embed) {
                    break;
                }
            }
        }
    }
}

/// Builds the webhook message for one run
///
/// # Arguments
///
/// * `run` - Status, timing and header facts from the fetch
/// * `fields` - Formatted metadata fields, in display order
/// * `config` - Username and avatar to post as
/// * `checked_at` - Timestamp shown on the embed
pub fn build_payload(
    run: &RunInfo,
    fields: Vec<DisplayField>,
    config: &WebhookConfig,
    checked_at: DateTime<Utc>,
) -> WebhookPayload {
    let domain = extract_domain(&run.final_url)
        .or_else(|| extract_domain(&run.requested_url))
        .unwrap_or_else(|| run.final_url.to_string());

    let mut all_fields = run_fields(run);
    all_fields.extend(fields);

    let footer = format!(
        "Checked by {} • {}",
        config.username,
        checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let mut embed = Embed {
        title: truncate(&format!("Page report: {}", domain), EMBED_TITLE_LIMIT),
        url: run.final_url.to_string(),
        color: status_color(run),
        fields: all_fields,
        timestamp: checked_at.to_rfc3339(),
        footer: EmbedFooter {
            text: truncate(&footer, FOOTER_TEXT_LIMIT),
        },
    };
    enforce_limits(&mut embed);

    WebhookPayload {
        username: config.username.clone(),
        avatar_url: config.avatar_url.clone(),
        allowed_mentions: AllowedMentions::default(),
        embeds: vec![embed],
    }
}
