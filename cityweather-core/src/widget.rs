//! Display state of the weather widget and the rules that fill it.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rand::Rng;
use std::fmt::Debug;
use tracing::debug;

use crate::{
    background::{Background, photo_url, random_gradient},
    flags::{FALLBACK_FLAG_PATH, flag_path},
    model::WeatherReport,
};

pub const ERROR_CITY: &str = "Ошибка загрузки";
pub const ERROR_COUNTRY: &str = "---";
pub const ERROR_TEMPERATURE: &str = "--°C";
pub const ERROR_CONDITIONS: &str = "Нет данных";

/// Answers whether an image URL can actually be loaded.
#[async_trait]
pub trait ImageProbe: Send + Sync + Debug {
    async fn is_available(&self, url: &str) -> bool;
}

/// Colour class of the temperature readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    pub fn for_temperature(temperature: i64) -> Self {
        if temperature >= 0 { Tone::Positive } else { Tone::Negative }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
        }
    }
}

/// What the widget currently shows.
///
/// A fresh view shows empty fields over the default gradient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetView {
    pub city_name: String,
    pub country_name: String,
    pub temperature: String,
    pub feels_like: String,
    pub tone: Option<Tone>,
    pub icon: String,
    pub conditions: String,
    pub humidity: String,
    pub background: Background,
    pub flag: Option<String>,
    pub updated_at: Option<DateTime<Local>>,
}

impl WidgetView {
    /// Replace every field with the report's contents.
    pub fn apply_report(&mut self, report: &WeatherReport, background: Background, flag: String) {
        self.city_name = report.city_name.clone();
        self.country_name = report.country.clone();
        self.temperature = format_temperature(report.temperature);
        self.feels_like = format_temperature(report.feels_like);
        self.tone = Some(Tone::for_temperature(report.temperature));
        self.icon = report.icon.clone();
        self.conditions = report.conditions.clone();
        self.humidity = format!("{}", report.humidity.round() as i64);
        self.background = background;
        self.flag = Some(flag);
        self.updated_at = Some(Local::now());
    }

    /// Show placeholders. Icon, feels-like, humidity and flag keep their previous values.
    pub fn show_error(&mut self, gradient: String) {
        self.city_name = ERROR_CITY.to_string();
        self.country_name = ERROR_COUNTRY.to_string();
        self.temperature = ERROR_TEMPERATURE.to_string();
        self.conditions = ERROR_CONDITIONS.to_string();
        self.background = Background::Gradient(gradient);
    }

    pub fn is_error(&self) -> bool {
        self.city_name == ERROR_CITY
    }
}

/// `+5°C`, `0°C`, `-3°C`.
pub fn format_temperature(value: i64) -> String {
    if value > 0 {
        format!("+{value}°C")
    } else {
        format!("{value}°C")
    }
}

/// Random choices for one render, drawn up front so no RNG is held across awaits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorations {
    pub photo_url: Option<String>,
    pub fallback_gradient: String,
}

impl Decorations {
    pub fn draw<R: Rng + ?Sized>(photo_base: &str, city_name: &str, rng: &mut R) -> Self {
        let photo_url = match photo_url(photo_base, city_name, rng) {
            Ok(url) => Some(url),
            Err(err) => {
                debug!(error = %err, "cannot build photo URL");
                None
            }
        };

        Self {
            photo_url,
            fallback_gradient: random_gradient(rng),
        }
    }

    pub fn random(photo_base: &str, city_name: &str) -> Self {
        Self::draw(photo_base, city_name, &mut rand::rng())
    }
}

/// Photo if it loads, otherwise the pre-drawn gradient.
pub async fn resolve_background(decorations: Decorations, probe: &dyn ImageProbe) -> Background {
    if let Some(url) = decorations.photo_url {
        if probe.is_available(&url).await {
            return Background::Photo(url);
        }
        debug!(url, "background photo unavailable, using gradient");
    }
    Background::Gradient(decorations.fallback_gradient)
}

/// Country flag if it loads, otherwise the fallback flag.
pub async fn resolve_flag(country_code: &str, probe: &dyn ImageProbe) -> String {
    let path = flag_path(country_code);
    if probe.is_available(&path).await {
        path
    } else {
        debug!(country_code, "flag unavailable, using fallback");
        FALLBACK_FLAG_PATH.to_string()
    }
}
