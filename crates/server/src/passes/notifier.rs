//! Notification boundary for submitted passes.
//!
//! Delivery (SMS) is not implemented; the shipped notifier only records the
//! intent.

use crate::models::PassRequest;
use async_trait::async_trait;
use tracing::info;

pub const SMS_NOTICE: &str =
    "We will notify you by SMS when your pass arrives at the nearest station.";

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called once after a pass request has been stored
    async fn pass_submitted(&self, pass: &PassRequest) -> anyhow::Result<()>;
}

/// Logs the notification instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn pass_submitted(&self, pass: &PassRequest) -> anyhow::Result<()> {
        info!(
            "[Notify] SMS pending for account {}: pass {} ({} -> {})",
            pass.account_id, pass.id, pass.from_place, pass.to_place
        );
        Ok(())
    }
}
