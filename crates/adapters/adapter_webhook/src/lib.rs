//! # unibridge-adapter-webhook
//!
//! Webhook notifier — implements the `Notifier` port by firing IFTTT maker
//! events: `GET {base_url}/trigger/{event}/with/key/{key}`.
//!
//! Triggers are fire-and-forget: [`Notifier::notify`] spawns the request on
//! the current tokio runtime and only logs its outcome.
//!
//! ## Dependency rule
//! Depends on `unibridge-app` for the port trait only.

pub mod config;
pub mod error;

use std::time::Duration;

use unibridge_app::ports::Notifier;

pub use config::WebhookConfig;
pub use error::WebhookError;

/// IFTTT maker webhook client.
#[derive(Debug, Clone)]
pub struct IftttNotifier {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl IftttNotifier {
    /// Build a notifier with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Http`] when the HTTP client cannot be built.
    pub fn new(config: WebhookConfig) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Trigger URL for `event`.
    fn trigger_url(&self, event: &str, key: &str) -> Result<String, WebhookError> {
        if event.is_empty() || event.contains(['/', '?', '#']) {
            return Err(WebhookError::InvalidEvent(event.to_string()));
        }
        let base = self.config.base_url.trim_end_matches('/');
        Ok(format!("{base}/trigger/{event}/with/key/{key}"))
    }

    /// Fire `event` and wait for the endpoint's answer.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MissingKey`] without a key,
    /// [`WebhookError::Http`] when the request fails and
    /// [`WebhookError::Status`] on a non-success answer.
    #[tracing::instrument(skip(self))]
    pub async fn trigger(&self, event: &str) -> Result<String, WebhookError> {
        let key = self.config.key.as_deref().ok_or(WebhookError::MissingKey)?;
        let url = self.trigger_url(event, key)?;
        // the URL carries the key
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Status { status });
        }
        let body = response.text().await?;
        tracing::debug!(%status, body = %body, "webhook triggered");
        Ok(body)
    }
}

impl Notifier for IftttNotifier {
    fn notify(&self, event: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(event, "no runtime to fire the webhook on");
            return;
        };
        let notifier = self.clone();
        let event = event.to_string();
        runtime.spawn(async move {
            if let Err(err) = notifier.trigger(&event).await {
                tracing::warn!(error = %err, event = %event, "webhook failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup(key: Option<&str>) -> (MockServer, IftttNotifier) {
        let server = MockServer::start().await;
        let config = WebhookConfig {
            key: key.map(str::to_string),
            base_url: server.uri(),
            ..WebhookConfig::default()
        };
        (server, IftttNotifier::new(config).unwrap())
    }

    #[tokio::test]
    async fn should_hit_trigger_endpoint() {
        let (server, notifier) = setup(Some("secret")).await;
        Mock::given(method("GET"))
            .and(path("/trigger/lights_on/with/key/secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Congratulations!"))
            .expect(1)
            .mount(&server)
            .await;

        let body = notifier.trigger("lights_on").await.unwrap();
        assert_eq!(body, "Congratulations!");
    }

    #[tokio::test]
    async fn should_report_error_status() {
        let (server, notifier) = setup(Some("wrong")).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = notifier.trigger("lights_on").await;
        assert!(matches!(result, Err(WebhookError::Status { status }) if status == 401));
    }

    #[tokio::test]
    async fn should_refuse_without_key() {
        let (server, notifier) = setup(None).await;
        let result = notifier.trigger("lights_on").await;
        assert!(matches!(result, Err(WebhookError::MissingKey)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_event_that_escapes_path() {
        let (_server, notifier) = setup(Some("secret")).await;
        let result = notifier.trigger("a/b").await;
        assert!(matches!(result, Err(WebhookError::InvalidEvent(_))));
    }

    #[tokio::test]
    async fn should_fire_and_forget_from_notify() {
        let (server, notifier) = setup(Some("secret")).await;
        Mock::given(method("GET"))
            .and(path("/trigger/doorbell/with/key/secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        notifier.notify("doorbell");
        for _ in 0..50 {
            if !server.received_requests().await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[test]
    fn should_not_panic_outside_runtime() {
        let notifier = IftttNotifier::new(WebhookConfig::with_key("secret")).unwrap();
        notifier.notify("doorbell");
    }
}
