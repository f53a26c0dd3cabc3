use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::{model::WeatherReport, widget::ImageProbe};

pub const RANDOM_WEATHER_PATH: &str = "/api/weather/random";

/// Why a poll produced no report. Every variant leads to the same error view.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to weather endpoint failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("weather endpoint returned an unusable payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("weather endpoint reported an error: {0}")]
    Reported(String),
}

/// HTTP client for the backend's random weather endpoint.
#[derive(Debug, Clone)]
pub struct WidgetClient {
    endpoint: String,
    http: Client,
}

impl WidgetClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client for the widget")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch one report. The HTTP status is ignored; only the body decides.
    pub async fn fetch(&self) -> Result<WeatherReport, FetchError> {
        let url = format!("{}{RANDOM_WEATHER_PATH}", self.endpoint);
        let body = self.http.get(&url).send().await?.bytes().await?;

        let value: serde_json::Value = serde_json::from_slice(&body)?;
        if let Some(error) = value.get("error") {
            let message = match error {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(FetchError::Reported(message));
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Treats an image as loadable when a GET for it succeeds.
///
/// Relative URLs are resolved against `base`.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    base: String,
    http: Client,
}

impl HttpImageProbe {
    pub fn new(base: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for image probing")?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{url}", self.base)
        } else {
            url.to_string()
        }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn is_available(&self, url: &str) -> bool {
        let target = self.absolute(url);
        match self.http.get(&target).send().await {
            Ok(res) => res.status().is_success(),
            Err(err) => {
                debug!(url = %target, error = %err, "image probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn report_json() -> serde_json::Value {
        serde_json::json!({
            "temperature": 21,
            "feels_like": 20,
            "humidity": 55.0,
            "conditions": "Ясно",
            "icon": "☀️",
            "city_name": "Rome",
            "country": "Италия",
            "country_code": "it",
            "city_photo": "linear-gradient(135deg, red, blue)"
        })
    }

    async fn serve(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RANDOM_WEATHER_PATH))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn fetches_report() {
        let server = serve(ResponseTemplate::new(200).set_body_json(report_json())).await;
        let client = WidgetClient::new(&format!("{}/", server.uri())).unwrap();

        let report = client.fetch().await.unwrap();
        assert_eq!(report.city_name, "Rome");
        assert_eq!(report.temperature, 21);
        assert_eq!(report.country_code, "it");
    }

    #[tokio::test]
    async fn error_field_wins_over_the_rest() {
        let mut body = report_json();
        body["error"] = serde_json::json!("Не удалось получить данные о погоде");
        let server = serve(ResponseTemplate::new(500).set_body_json(body)).await;
        let client = WidgetClient::new(&server.uri()).unwrap();

        match client.fetch().await {
            Err(FetchError::Reported(msg)) => {
                assert_eq!(msg, "Не удалось получить данные о погоде")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server =
            serve(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>")).await;
        let client = WidgetClient::new(&server.uri()).unwrap();

        assert!(matches!(client.fetch().await, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn missing_fields_are_malformed() {
        let server = serve(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "city_name": "Rome" })),
        )
        .await;
        let client = WidgetClient::new(&server.uri()).unwrap();

        assert!(matches!(client.fetch().await, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let client = WidgetClient::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn http_probe_follows_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/flags/it.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;

        let probe = HttpImageProbe::new(&server.uri()).unwrap();
        assert!(probe.is_available("/static/flags/it.png").await);
        assert!(!probe.is_available("/static/flags/zz.png").await);
        assert!(
            probe
                .is_available(&format!("{}/static/flags/it.png", server.uri()))
                .await
        );
    }
}
