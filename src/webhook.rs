use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Payload sent to the configured hook after a post is stored.
#[derive(Serialize, Clone, Debug)]
pub struct PostNotification {
    pub platform: String,
    pub caption: String,
    pub asset_url: String,
    pub schedule: DateTime<Utc>,
    pub post_id: Uuid,
}

/// Whether a notification was handed to the background task. Dispatch says
/// nothing about delivery: the task logs failures and nobody waits on it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Notification {
    Skipped,
    Dispatched,
}

/// Fire-and-forget notifier for an optional outbound webhook (Zapier or
/// similar). Delivery failures are logged and never surfaced to the caller.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        Self {
            url: (!url.is_empty()).then(|| url.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub fn notify(&self, payload: PostNotification) -> Notification {
        let Some(url) = self.url.clone() else {
            return Notification::Skipped;
        };

        let client = self.client.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(post_id = %payload.post_id, "webhook notified");
                }
                Ok(resp) => {
                    tracing::warn!(
                        post_id = %payload.post_id,
                        status = %resp.status(),
                        "webhook rejected, post queued locally"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        post_id = %payload.post_id,
                        "webhook failed, post queued locally: {e}"
                    );
                }
            }
        });

        Notification::Dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_notifier_skips() {
        let notifier = WebhookNotifier::new("");

        assert!(!notifier.is_configured());

        let outcome = notifier.notify(PostNotification {
            platform: String::from("tiktok"),
            caption: String::new(),
            asset_url: String::new(),
            schedule: Utc::now(),
            post_id: Uuid::new_v4(),
        });

        assert_eq!(outcome, Notification::Skipped);
    }

    #[tokio::test]
    async fn test_configured_notifier_dispatches() {
        let notifier = WebhookNotifier::new("http://localhost:1/hook");

        let outcome = notifier.notify(PostNotification {
            platform: String::from("tiktok"),
            caption: String::from("caption"),
            asset_url: String::new(),
            schedule: Utc::now(),
            post_id: Uuid::new_v4(),
        });

        // The send itself fails in the background; dispatch still succeeds.
        assert_eq!(outcome, Notification::Dispatched);
    }
}
