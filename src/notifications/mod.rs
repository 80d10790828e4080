//! Outbound Slack notifications.
//!
//! Every notification is best-effort: callers invoke the notifier and
//! ignore its outcome, so a Slack outage never fails a price update,
//! request submission, or approval. The notifier is injected as
//! `Arc<dyn Notifier>` so tests can swap in [`NoopNotifier`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// A Block Kit message destined for the configured channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub blocks: Value,
}

/// Details of a newly submitted price-change request.
#[derive(Debug, Clone)]
pub struct RequestSubmitted {
    pub request_id: Uuid,
    pub material_name: String,
    pub distributor: String,
    pub requested_price: Decimal,
    pub current_price: Option<Decimal>,
    pub submitted_by: String,
}

/// Details of an approved price-change request.
#[derive(Debug, Clone)]
pub struct RequestApproved {
    pub material_name: String,
    pub distributor: String,
    pub new_price: Decimal,
    pub old_price: Option<Decimal>,
    pub approved_by: String,
}

/// Details of a direct admin price edit or material creation.
#[derive(Debug, Clone)]
pub struct AdminPriceUpdate {
    pub material_name: String,
    pub distributor: String,
    pub location: String,
    pub new_price: Decimal,
    pub old_price: Option<Decimal>,
    pub updated_by: String,
}

fn price_change_text(old_price: Option<Decimal>, new_price: Decimal) -> String {
    match old_price {
        Some(old) => format!("${} → ${}", old, new_price),
        None => format!("${}", new_price),
    }
}

fn field(label: &str, value: &str) -> Value {
    json!({ "type": "mrkdwn", "text": format!("*{}:*\n{}", label, value) })
}

impl ChannelMessage {
    /// New request announcement with interactive approve/reject buttons.
    pub fn request_submitted(details: &RequestSubmitted) -> Self {
        let change = price_change_text(details.current_price, details.requested_price);
        Self {
            blocks: json!([
                {
                    "type": "header",
                    "text": { "type": "plain_text", "text": "💰 New Price Change Request" }
                },
                {
                    "type": "section",
                    "fields": [
                        field("Material", &details.material_name),
                        field("Distributor", &details.distributor),
                        field("Price Change", &change),
                        field("Requested by", &details.submitted_by),
                    ]
                },
                {
                    "type": "actions",
                    "elements": [
                        {
                            "type": "button",
                            "text": { "type": "plain_text", "text": "✅ Approve" },
                            "style": "primary",
                            "value": format!("approve_{}", details.request_id),
                            "action_id": "approve_price_change"
                        },
                        {
                            "type": "button",
                            "text": { "type": "plain_text", "text": "❌ Reject" },
                            "style": "danger",
                            "value": format!("reject_{}", details.request_id),
                            "action_id": "reject_price_change"
                        }
                    ]
                }
            ]),
        }
    }

    /// Approval announcement.
    pub fn request_approved(details: &RequestApproved) -> Self {
        let change = price_change_text(details.old_price, details.new_price);
        Self {
            blocks: json!([
                {
                    "type": "header",
                    "text": { "type": "plain_text", "text": "✅ Price Change Approved" }
                },
                {
                    "type": "section",
                    "fields": [
                        field("Material", &details.material_name),
                        field("Distributor", &details.distributor),
                        field("Price Change", &change),
                        field("Approved by", &details.approved_by),
                    ]
                }
            ]),
        }
    }

    /// Direct admin edit announcement.
    pub fn admin_price_update(details: &AdminPriceUpdate) -> Self {
        let change = price_change_text(details.old_price, details.new_price);
        Self {
            blocks: json!([
                {
                    "type": "header",
                    "text": { "type": "plain_text", "text": "⚡ Admin Price Update" }
                },
                {
                    "type": "section",
                    "fields": [
                        field("Material", &details.material_name),
                        field("Distributor", &details.distributor),
                        field("Location", &details.location),
                        field("Price Change", &change),
                        field("Updated by", &details.updated_by),
                    ]
                }
            ]),
        }
    }
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack API error: {0}")]
    Api(String),
}

/// Posts messages to the notification channel. Returns the provider's
/// message timestamp so callers can correlate follow-ups.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_message(
        &self,
        message: ChannelMessage,
    ) -> Result<Option<String>, NotificationError>;
}

/// Slack Web API implementation of [`Notifier`].
#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    bot_token: String,
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    ts: Option<String>,
    error: Option<String>,
}

impl SlackNotifier {
    pub fn new(bot_token: String, channel_id: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            bot_token,
            channel_id,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    #[instrument(skip(self, message))]
    async fn post_message(
        &self,
        message: ChannelMessage,
    ) -> Result<Option<String>, NotificationError> {
        let payload = json!({
            "channel": self.channel_id,
            "blocks": message.blocks,
        });

        let response = self
            .client
            .post("https://slack.com/api/chat.postMessage")
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?
            .json::<PostMessageResponse>()
            .await?;

        if !response.ok {
            return Err(NotificationError::Api(
                response.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        info!(channel = %self.channel_id, ts = ?response.ts, "Slack message posted");
        Ok(response.ts)
    }
}

/// No-op implementation used when Slack is not configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn post_message(
        &self,
        _message: ChannelMessage,
    ) -> Result<Option<String>, NotificationError> {
        warn!("Slack not configured - skipping message");
        Ok(None)
    }
}

/// Awaits the post and swallows any failure; returns the message
/// timestamp when delivery succeeded.
pub async fn post_best_effort(
    notifier: &Arc<dyn Notifier>,
    message: ChannelMessage,
) -> Option<String> {
    match notifier.post_message(message).await {
        Ok(ts) => ts,
        Err(e) => {
            error!("Notification delivery failed: {}", e);
            None
        }
    }
}

/// Fire-and-forget delivery for callers that do not need the timestamp.
pub fn post_detached(notifier: Arc<dyn Notifier>, message: ChannelMessage) {
    tokio::spawn(async move {
        if let Err(e) = notifier.post_message(message).await {
            error!("Async notification delivery failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn request_message_carries_buttons_and_change_text() {
        let details = RequestSubmitted {
            request_id: Uuid::nil(),
            material_name: "Timberline HDZ".into(),
            distributor: "ABCSupply".into(),
            requested_price: dec!(125.50),
            current_price: Some(dec!(100.00)),
            submitted_by: "Jordan".into(),
        };

        let message = ChannelMessage::request_submitted(&details);
        let rendered = message.blocks.to_string();
        assert!(rendered.contains("$100.00 → $125.50"));
        assert!(rendered.contains("approve_price_change"));
        assert!(rendered.contains("reject_price_change"));
    }

    #[test]
    fn first_price_omits_arrow() {
        assert_eq!(price_change_text(None, dec!(9.99)), "$9.99");
        assert_eq!(
            price_change_text(Some(dec!(1.00)), dec!(2.00)),
            "$1.00 → $2.00"
        );
    }

    #[tokio::test]
    async fn noop_notifier_reports_no_timestamp() {
        let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);
        let details = RequestApproved {
            material_name: "Deck Screws".into(),
            distributor: "Beacon".into(),
            new_price: dec!(12.00),
            old_price: None,
            approved_by: "Sam".into(),
        };

        let ts = post_best_effort(&notifier, ChannelMessage::request_approved(&details)).await;
        assert_eq!(ts, None);
    }
}
