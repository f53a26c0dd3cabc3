use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{City, config::ProviderConfig, model::CurrentConditions};

use super::WeatherProvider;

const TIMELINE_PATH: &str = "VisualCrossingWebServices/rest/services/timeline";

#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: String, config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for Visual Crossing")?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            http,
        })
    }

    fn timeline_url(&self, city: &City) -> String {
        format!("{}/{TIMELINE_PATH}/{},{}", self.base_url, city.lat, city.lon)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VcTimelineResponse {
    current_conditions: Option<VcCurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct VcCurrentConditions {
    temp: f64,
    feelslike: f64,
    humidity: f64,
    conditions: Option<String>,
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    async fn current_conditions(&self, city: &City) -> Result<CurrentConditions> {
        debug!(city = %city.name, "requesting current conditions");

        let res = self
            .http
            .get(self.timeline_url(city))
            .query(&[
                ("unitGroup", "metric"),
                ("key", self.api_key.as_str()),
                ("contentType", "json"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Visual Crossing for {}", city.name))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Visual Crossing response body")?;

        if !status.is_success() {
            warn!(city = %city.name, %status, "Visual Crossing returned an error status");
            return Err(anyhow!(
                "Visual Crossing request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: VcTimelineResponse =
            serde_json::from_str(&body).context("Failed to parse Visual Crossing JSON")?;

        let current = parsed
            .current_conditions
            .ok_or_else(|| anyhow!("Visual Crossing response has no current conditions"))?;

        Ok(CurrentConditions {
            temp: current.temp,
            feels_like: current.feelslike,
            humidity: current.humidity,
            conditions: current.conditions,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn paris() -> City {
        City {
            name: "Paris".into(),
            country: "Франция".into(),
            country_code: "FR".into(),
            lat: 48.85,
            lon: 2.35,
        }
    }

    fn provider_for(server: &MockServer) -> VisualCrossingProvider {
        let config = ProviderConfig {
            base_url: server.uri(),
            ..ProviderConfig::default()
        };
        VisualCrossingProvider::new("KEY".into(), &config).unwrap()
    }

    #[tokio::test]
    async fn parses_current_conditions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(
                "/VisualCrossingWebServices/rest/services/timeline/48.85,2.35",
            ))
            .and(query_param("key", "KEY"))
            .and(query_param("unitGroup", "metric"))
            .and(query_param("lang", "ru"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "currentConditions": {
                    "temp": 12.5,
                    "feelslike": 10.1,
                    "humidity": 81.3,
                    "conditions": "Пасмурно"
                }
            })))
            .mount(&server)
            .await;

        let current = provider_for(&server)
            .current_conditions(&paris())
            .await
            .unwrap();

        assert_eq!(current.temp, 12.5);
        assert_eq!(current.feels_like, 10.1);
        assert_eq!(current.humidity, 81.3);
        assert_eq!(current.conditions.as_deref(), Some("Пасмурно"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("No account found"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_conditions(&paris())
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("401"), "{msg}");
        assert!(msg.contains("No account found"), "{msg}");
    }

    #[tokio::test]
    async fn missing_current_conditions_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "days": []
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_conditions(&paris())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no current conditions"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "ы".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
