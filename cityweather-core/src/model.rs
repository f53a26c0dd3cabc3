use serde::{Deserialize, Serialize};

/// One entry of the cities file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
}

/// Payload of `GET /api/weather/random`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: f64,
    pub conditions: String,
    pub icon: String,
    pub city_name: String,
    pub country: String,
    pub country_code: String,
    /// CSS gradient derived from the city, see [`crate::background::city_gradient`].
    #[serde(default)]
    pub city_photo: String,
}

/// Body returned by the endpoint when no report could be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

/// Raw observation as returned by a [`crate::WeatherProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub conditions: Option<String>,
}
