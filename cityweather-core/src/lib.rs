//! Core library for the `cityweather` widget and backend.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The city catalog and its no-repeat rotation
//! - Abstraction over weather providers (Visual Crossing)
//! - Condition translation, icons, decorative backgrounds and flags
//! - The widget's display model, HTTP client and poller
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod background;
pub mod cities;
pub mod client;
pub mod conditions;
pub mod config;
pub mod flags;
pub mod model;
pub mod poller;
pub mod provider;
pub mod service;
pub mod widget;

pub use background::Background;
pub use cities::{CityCatalog, CityRotation};
pub use client::{FetchError, HttpImageProbe, WidgetClient};
pub use config::Config;
pub use flags::{DirImageProbe, FlagDownloader};
pub use model::{City, ErrorReply, WeatherReport};
pub use poller::Poller;
pub use provider::{WeatherProvider, provider_from_config};
pub use service::WeatherService;
pub use widget::{ImageProbe, Tone, WidgetView};
