//! Markdown rendering of a report
//!
//! Used for dry runs and as the console fallback when delivery fails, so the
//! scraped data is never silently lost.

use crate::output::payload::WebhookPayload;
use crate::output::traits::Reporter;
use crate::DeliveryError;

/// Formats a webhook message as a standalone markdown document
///
/// Inline fields are collected into a bullet list under the title; block
/// fields each get their own section, in the order they appear in the embed.
pub fn format_markdown_report(payload: &WebhookPayload) -> String {
    let mut md = String::new();

    for embed in &payload.embeds {
        md.push_str(&format!("# {}\n\n", embed.title));
        md.push_str(&format!("<{}>\n\n", embed.url));

        let (inline, blocks): (Vec<_>, Vec<_>) = embed.fields.iter().partition(|f| f.inline);

        for field in &inline {
            md.push_str(&format!("- **{}**: {}\n", field.name, field.value));
        }
        if !inline.is_empty() {
            md.push('\n');
        }

        for field in blocks {
            md.push_str(&format!("## {}\n\n", field.name));
            md.push_str(&field.value);
            md.push_str("\n\n");
        }

        md.push_str(&format!("_{}_\n", embed.footer.text));
    }

    md
}

/// Prints reports to stdout instead of posting them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        println!("{}", format_markdown_report(payload));
        Ok(())
    }
}
