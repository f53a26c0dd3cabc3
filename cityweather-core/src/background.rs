use anyhow::{Context, Result};
use rand::{Rng, seq::IndexedRandom};
use url::Url;

/// Gradient used when nothing better is available.
pub const DEFAULT_GRADIENT: &str = "linear-gradient(135deg, #667eea 0%, #764ba2 100%)";

/// Gradients shown when a background photo cannot be loaded or the fetch failed.
pub const FALLBACK_GRADIENTS: [&str; 7] = [
    DEFAULT_GRADIENT,
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #d299c2 0%, #fef9d7 100%)",
];

const PHOTO_QUERIES: [&str; 5] = [
    "city modern skyline night",
    "urban architecture contemporary",
    "downtown lights evening",
    "cityscape modern buildings",
    "metropolis night view",
];

/// What the widget paints behind the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    Photo(String),
    Gradient(String),
}

impl Background {
    /// Value suitable for a CSS `background-image` property.
    pub fn css(&self) -> String {
        match self {
            Background::Photo(url) => format!("url('{url}')"),
            Background::Gradient(gradient) => gradient.clone(),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Gradient(DEFAULT_GRADIENT.to_string())
    }
}

// FNV-1a, stable across processes and platforms.
fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Deterministic gradient for a city, so every city keeps its own colours.
pub fn city_gradient(city_name: &str, country: &str) -> String {
    let city_id = format!("{city_name}_{country}").to_lowercase().replace(' ', "_");
    let hash = stable_hash(&city_id);

    let hue1 = hash % 360;
    let hue2 = (hash % 360 + 120) % 360;
    let hue3 = (hash % 360 + 240) % 360;

    match hash % 5 {
        0 => format!(
            "linear-gradient(135deg, hsl({hue1}, 70%, 50%) 0%, hsl({hue2}, 70%, 60%) 100%)"
        ),
        1 => format!(
            "linear-gradient(135deg, hsl({hue2}, 70%, 40%) 0%, hsl({hue3}, 70%, 50%) 100%)"
        ),
        2 => format!(
            "linear-gradient(135deg, hsl({hue3}, 70%, 30%) 0%, hsl({hue1}, 70%, 40%) 100%)"
        ),
        3 => format!(
            "radial-gradient(circle at 30% 20%, hsl({hue1}, 80%, 60%), hsl({hue2}, 80%, 40%))"
        ),
        _ => format!(
            "conic-gradient(from 90deg, hsl({hue1}, 70%, 50%), hsl({hue2}, 70%, 50%), hsl({hue3}, 70%, 50%))"
        ),
    }
}

pub fn random_gradient<R: Rng + ?Sized>(rng: &mut R) -> String {
    FALLBACK_GRADIENTS
        .choose(rng)
        .copied()
        .unwrap_or(DEFAULT_GRADIENT)
        .to_string()
}

/// [`random_gradient`] with the thread-local generator.
pub fn any_gradient() -> String {
    random_gradient(&mut rand::rng())
}

/// Image search URL for a random photo query about `city_name`.
pub fn photo_url<R: Rng + ?Sized>(base: &str, city_name: &str, rng: &mut R) -> Result<String> {
    let suffix = PHOTO_QUERIES.choose(rng).copied().unwrap_or(PHOTO_QUERIES[0]);
    let query = format!("{city_name} {suffix}");

    let mut url =
        Url::parse(base).with_context(|| format!("Invalid image search base URL: {base}"))?;
    url.set_query(Some(&urlencoding::encode(&query)));

    Ok(url.to_string())
}
