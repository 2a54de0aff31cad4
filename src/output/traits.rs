//! Reporter trait
//!
//! A reporter receives the finished webhook message of a run. The pipeline
//! calls [`Reporter::deliver`] exactly once per successful scrape and never
//! retries it.

use crate::output::payload::WebhookPayload;
use crate::DeliveryError;

/// Destination for finished reports
#[allow(async_fn_in_trait)]
pub trait Reporter {
    /// Delivers one report
    ///
    /// # Arguments
    ///
    /// * `payload` - The complete, size-bounded message
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The destination accepted the report
    /// * `Err(DeliveryError)` - The destination rejected it or could not be reached
    async fn deliver(&self, payload: &WebhookPayload) -> Result<(), DeliveryError>;
}
