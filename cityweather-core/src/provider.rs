use crate::{City, Config, model::CurrentConditions, provider::visualcrossing::VisualCrossingProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod visualcrossing;

/// Source of current weather observations for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, city: &City) -> anyhow::Result<CurrentConditions>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let provider = VisualCrossingProvider::new(api_key.to_owned(), &config.provider)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No Visual Crossing API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
