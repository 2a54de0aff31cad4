//! Discord webhook limits, as documented for the execute-webhook endpoint
//!
//! Lengths are counted in characters.

/// Embed title
pub const EMBED_TITLE_LIMIT: usize = 256;

/// Embed field name
pub const FIELD_NAME_LIMIT: usize = 256;

/// Embed field value
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Embed footer text
pub const FOOTER_TEXT_LIMIT: usize = 2048;

/// Fields per embed
pub const MAX_FIELDS: usize = 25;

/// Sum of title, description, field names and values, footer text and author name
pub const EMBED_TOTAL_LIMIT: usize = 6000;

/// Webhook username override
pub const USERNAME_LIMIT: usize = 80;

/// HTTP statuses the endpoint answers with on success (204 without `?wait=true`)
pub const SUCCESS_STATUSES: &[u16] = &[200, 204];
