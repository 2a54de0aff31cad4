//! Display formatting for the webhook destination
//!
//! Turns a [`PageMetadata`] into an ordered list of embed fields whose
//! values are escaped for Discord markdown and bounded by the destination's
//! length limits. Absent metadata produces no field at all.

use crate::output::limits::{FIELD_NAME_LIMIT, FIELD_VALUE_LIMIT};
use crate::scrape::{HeadingLevel, LinkSet, PageMetadata};
use serde::Serialize;

/// Appended to any value cut short
pub const TRUNCATION_MARKER: &str = "…";

/// Used where the destination requires a value but there is none
pub const PLACEHOLDER: &str = "—";

/// Entries shown for list-valued fields
pub const SAMPLE_SIZE: usize = 5;

/// Entries shown for the Open Graph / Twitter field
pub const SOCIAL_SAMPLE_SIZE: usize = 10;

/// Per-paragraph cap inside the summary field
pub const SUMMARY_LINE_LIMIT: usize = 200;

/// JSON-LD blocks rendered
pub const JSON_LD_BLOCKS: usize = 2;

/// Characters that trigger emphasis, code, spoilers, quotes, masked links or headers
const MARKDOWN_SPECIAL: &[char] = &['\\', '*', '_', '`', '~', '|', '>', '[', ']', '#'];

/// One embed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl DisplayField {
    /// Builds a field, bounding the name and value to the destination limits
    ///
    /// An empty value is replaced by [`PLACEHOLDER`] since the destination
    /// rejects empty field values.
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        let value = if value.trim().is_empty() {
            PLACEHOLDER.to_string()
        } else {
            truncate(&value, FIELD_VALUE_LIMIT)
        };

        Self {
            name: truncate(&name.into(), FIELD_NAME_LIMIT),
            value,
            inline,
        }
    }

    /// Characters this field contributes to the embed total
    pub fn char_len(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }
}

/// Escapes Discord markdown so every character renders literally
///
/// # Examples
///
/// ```
/// use scrape_herald::output::escape_markdown;
///
/// assert_eq!(escape_markdown("*bold* _it_"), r"\*bold\* \_it\_");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Bounds `text` to `limit` characters
///
/// Text within the limit is returned unchanged. Longer text is cut to
/// `limit - 1` characters and [`TRUNCATION_MARKER`] appended, so the result
/// is exactly `limit` characters. A dangling escape backslash left by the cut
/// is removed so the marker stays literal.
///
/// # Examples
///
/// ```
/// use scrape_herald::output::truncate;
///
/// assert_eq!(truncate("short", 10), "short");
/// assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
/// ```
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    let keep = limit.saturating_sub(marker_len);
    let mut cut: String = text.chars().take(keep).collect();

    let trailing_backslashes = cut.chars().rev().take_while(|c| *c == '\\').count();
    if trailing_backslashes % 2 == 1 {
        cut.pop();
    }

    cut.push_str(TRUNCATION_MARKER);
    cut
}

/// Renders a sample of `lines` plus an "and N more" trailer
///
/// `total` is the full number of entries, which may exceed `lines.len()`
/// when the caller already capped the list. The trailer is always kept
/// within [`FIELD_VALUE_LIMIT`]; the sample is truncated to make room.
pub fn format_list(lines: &[String], total: usize, sample: usize) -> String {
    let shown = lines.len().min(sample);
    let body = lines[..shown].join("\n");

    let remaining = total.saturating_sub(shown);
    if remaining == 0 {
        return truncate(&body, FIELD_VALUE_LIMIT);
    }

    let trailer = format!("\nand {} more", remaining);
    let room = FIELD_VALUE_LIMIT.saturating_sub(trailer.chars().count());
    format!("{}{}", truncate(&body, room), trailer)
}

/// Escaped and bounded text field, or nothing when the value is absent
fn text_field(name: &str, value: Option<&str>, inline: bool) -> Option<DisplayField> {
    value.map(|v| DisplayField::new(name, escape_markdown(v), inline))
}

/// URL field; URLs are bounded but not escaped
fn url_field(name: &str, value: Option<&str>) -> Option<DisplayField> {
    value.map(|v| DisplayField::new(name, v, false))
}

fn heading_field(metadata: &PageMetadata, level: HeadingLevel) -> Option<DisplayField> {
    let texts = metadata.headings_at(level);
    if texts.is_empty() {
        return None;
    }

    let lines: Vec<String> = texts
        .iter()
        .map(|t| format!("- {}", escape_markdown(t)))
        .collect();

    let noun = match level {
        HeadingLevel::H1 => "Headlines",
        HeadingLevel::H2 => "Subheadlines",
    };
    let name = format!("H{} {} ({})", level.as_u8(), noun, texts.len());

    Some(DisplayField::new(
        name,
        format_list(&lines, lines.len(), SAMPLE_SIZE),
        false,
    ))
}

fn summary_field(paragraphs: &[String]) -> Option<DisplayField> {
    if paragraphs.is_empty() {
        return None;
    }

    let lines: Vec<String> = paragraphs
        .iter()
        .map(|p| format!("- {}", truncate(&escape_markdown(p), SUMMARY_LINE_LIMIT)))
        .collect();

    Some(DisplayField::new(
        "Summary Paragraphs",
        format_list(&lines, lines.len(), SAMPLE_SIZE),
        false,
    ))
}

fn images_field(metadata: &PageMetadata) -> Option<DisplayField> {
    if metadata.image_count == 0 {
        return None;
    }

    Some(DisplayField::new(
        format!("Images ({})", metadata.image_count),
        format_list(&metadata.images, metadata.image_count, SAMPLE_SIZE),
        false,
    ))
}

fn social_field(metadata: &PageMetadata) -> Option<DisplayField> {
    let lines: Vec<String> = metadata
        .open_graph
        .iter()
        .map(|(k, v)| format!("og:{}: {}", k, v))
        .chain(
            metadata
                .twitter_card
                .iter()
                .map(|(k, v)| format!("twitter:{}: {}", k, v)),
        )
        .map(|line| escape_markdown(&line))
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(DisplayField::new(
        "Open Graph & Twitter Cards",
        format_list(&lines, lines.len(), SOCIAL_SAMPLE_SIZE),
        false,
    ))
}

/// Count field (always present) plus a sample field when non-empty
fn link_fields(label: &str, links: &LinkSet) -> Vec<DisplayField> {
    let mut fields = vec![DisplayField::new(
        format!("{} Links", label),
        links.count().to_string(),
        true,
    )];

    if !links.is_empty() {
        let sample = links.sample(SAMPLE_SIZE).to_vec();
        fields.push(DisplayField::new(
            format!("{} Links Sample", label),
            format_list(&sample, links.count(), SAMPLE_SIZE),
            false,
        ));
    }

    fields
}

fn json_ld_field(blocks: &[serde_json::Value]) -> Option<DisplayField> {
    if blocks.is_empty() {
        return None;
    }

    let rendered = blocks
        .iter()
        .take(JSON_LD_BLOCKS)
        .map(|block| serde_json::to_string_pretty(block).unwrap_or_else(|_| block.to_string()))
        .collect::<Vec<_>>()
        .join("\n");

    let name = if blocks.len() > JSON_LD_BLOCKS {
        format!(
            "JSON-LD Structured Data (first {} of {})",
            JSON_LD_BLOCKS,
            blocks.len()
        )
    } else {
        format!("JSON-LD Structured Data ({})", blocks.len())
    };

    Some(DisplayField::new(name, escape_markdown(&rendered), false))
}

/// Formats page metadata into ordered embed fields
///
/// Fields for absent values are omitted. Link counts are always present.
pub fn format_metadata(metadata: &PageMetadata) -> Vec<DisplayField> {
    let mut fields = Vec::new();

    fields.extend(text_field("Title", metadata.title.as_deref(), false));
    fields.extend(text_field(
        "Meta Description",
        metadata.description.as_deref(),
        false,
    ));
    fields.extend(text_field("Meta Keywords", metadata.keywords.as_deref(), false));
    fields.extend(text_field("Charset", metadata.charset.as_deref(), true));
    fields.extend(text_field("Language", metadata.language.as_deref(), true));
    fields.extend(url_field("Canonical URL", metadata.canonical_url.as_deref()));
    fields.extend(text_field("Robots Meta", metadata.robots.as_deref(), false));
    fields.extend(heading_field(metadata, HeadingLevel::H1));
    fields.extend(heading_field(metadata, HeadingLevel::H2));
    fields.extend(summary_field(&metadata.paragraphs));
    fields.extend(url_field("Favicon", metadata.favicon.as_deref()));
    fields.extend(images_field(metadata));
    fields.extend(social_field(metadata));
    fields.extend(link_fields("Internal", &metadata.internal_links));
    fields.extend(link_fields("External", &metadata.external_links));
    fields.extend(json_ld_field(&metadata.json_ld));

    fields
}
