use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of a delivery attempt reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    /// Provider-side message reference, when the provider returns one
    pub provider_reference: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("notification send failed: {0}")]
pub struct SendError(pub String);

/// Outbound notification seam. The alert queue only needs this contract;
/// SMS gateways, email relays and test doubles all sit behind it.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<DeliveryOutcome, SendError>;
}

/// Default sender that records deliveries in the log stream. Used in
/// development and as the fallback when no provider is configured.
#[derive(Debug, Default, Clone)]
pub struct TracingSender;

#[async_trait]
impl NotificationSender for TracingSender {
    async fn send(&self, recipient: &str, message: &str) -> Result<DeliveryOutcome, SendError> {
        info!(recipient = %recipient, "Delivering notification: {}", message);
        Ok(DeliveryOutcome {
            delivered: true,
            provider_reference: None,
        })
    }
}
