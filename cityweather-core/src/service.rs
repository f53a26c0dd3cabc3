use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    WeatherProvider,
    background::city_gradient,
    cities::{CityCatalog, CityRotation},
    conditions::{icon_for, translate},
    model::{City, WeatherReport},
};

/// Produces the report served by `GET /api/weather/random`.
#[derive(Debug)]
pub struct WeatherService {
    rotation: Mutex<CityRotation>,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(catalog: CityCatalog, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            rotation: Mutex::new(CityRotation::new(catalog)),
            provider,
        }
    }

    pub fn catalog_len(&self) -> usize {
        self.rotation.lock().catalog().len()
    }

    /// Weather for the next city of the rotation.
    pub async fn random_report(&self) -> Result<WeatherReport> {
        let city = self.rotation.lock().next_city(&mut rand::rng());
        self.report_for(&city).await
    }

    pub async fn report_for(&self, city: &City) -> Result<WeatherReport> {
        let current = match self.provider.current_conditions(city).await {
            Ok(current) => current,
            Err(err) => {
                warn!(city = %city.name, error = %err, "failed to get weather");
                return Err(err);
            }
        };

        let raw_conditions = current.conditions.unwrap_or_else(|| "Unknown".to_string());
        info!(city = %city.name, conditions = %raw_conditions, "got current conditions");

        Ok(WeatherReport {
            temperature: round_half_even(current.temp),
            feels_like: round_half_even(current.feels_like),
            humidity: current.humidity,
            conditions: translate(&raw_conditions),
            icon: icon_for(&raw_conditions).to_string(),
            city_name: city.name.clone(),
            country: city.country.clone(),
            country_code: city.country_code.to_lowercase(),
            city_photo: city_gradient(&city.name, &city.country),
        })
    }
}

fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}
