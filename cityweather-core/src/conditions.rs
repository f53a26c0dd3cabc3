//! Condition text translation and icon lookup.
//!
//! The provider is queried in Russian, but some descriptions still come back
//! in English, so both tables are consulted.

use tracing::debug;

pub const DEFAULT_ICON: &str = "⛅";

const TRANSLATIONS: &[(&str, &str)] = &[
    ("Clear", "Ясно"),
    ("Sunny", "Солнечно"),
    ("Partly cloudy", "Переменная облачность"),
    ("Cloudy", "Облачно"),
    ("Overcast", "Пасмурно"),
    ("Rain", "Дождь"),
    ("Rain, Partially cloudy", "Дождь, Переменная облачность"),
    ("Rain, Overcast", "Дождь, Пасмурно"),
    ("Snow", "Снег"),
    ("Thunderstorm", "Гроза"),
    ("Fog", "Туман"),
    ("Mist", "Дымка"),
    ("Partly Cloudy", "Переменная облачность"),
    ("Mostly Cloudy", "В основном облачно"),
    ("Light rain", "Небольшой дождь"),
    ("Heavy rain", "Сильный дождь"),
    ("Light snow", "Небольшой снег"),
    ("Heavy snow", "Сильный снег"),
    ("Drizzle", "Морось"),
    ("Hail", "Град"),
    ("Sleet", "Мокрый снег"),
    ("Windy", "Ветрено"),
    ("Breezy", "Порывистый ветер"),
    ("Clear throughout the day.", "Ясно в течение дня"),
    ("Possible light rain until evening.", "Возможен небольшой дождь до вечера"),
    ("Light rain throughout the day.", "Небольшой дождь в течение дня"),
    ("Overcast throughout the day.", "Пасмурно в течение дня"),
    ("Foggy in the morning.", "Туманно утром"),
    ("Partly cloudy throughout the day.", "Переменная облачность в течение дня"),
    ("Mostly cloudy throughout the day.", "В основном облачно в течение дня"),
    ("Rain throughout the day.", "Дождь в течение дня"),
    ("Snow throughout the day.", "Снег в течение дня"),
];

const ICONS_EN: &[(&str, &str)] = &[
    ("Clear", "☀️"),
    ("Sunny", "☀️"),
    ("Partly cloudy", "⛅"),
    ("Cloudy", "☁️"),
    ("Overcast", "☁️"),
    ("Mostly Cloudy", "☁️"),
    ("Partly Cloudy", "⛅"),
    ("Mist", "🌫️"),
    ("Fog", "🌫️"),
    ("Light fog", "🌫️"),
    ("Rain", "🌧️"),
    ("Light rain", "🌦️"),
    ("Heavy rain", "⛈️"),
    ("Moderate rain", "🌧️"),
    ("Drizzle", "🌦️"),
    ("Snow", "❄️"),
    ("Light snow", "🌨️"),
    ("Heavy snow", "❄️❄️"),
    ("Thunderstorm", "⛈️"),
    ("Storm", "⛈️"),
    ("Hail", "🧊"),
    ("Sleet", "🌨️💧"),
    ("Windy", "💨"),
    ("Breezy", "💨"),
    ("Clear throughout the day.", "☀️"),
    ("Possible light rain until evening.", "🌦️"),
    ("Light rain throughout the day.", "🌦️"),
    ("Overcast throughout the day.", "☁️"),
    ("Foggy in the morning.", "🌫️"),
    ("Partly cloudy throughout the day.", "⛅"),
    ("Mostly cloudy throughout the day.", "☁️"),
    ("Rain throughout the day.", "🌧️"),
    ("Snow throughout the day.", "❄️"),
];

const ICONS_RU: &[(&str, &str)] = &[
    ("Ясно", "☀️"),
    ("Солнечно", "☀️"),
    ("Ясно в течение дня", "☀️"),
    ("Переменная облачность", "⛅"),
    ("Облачно", "☁️"),
    ("Пасмурно", "☁️"),
    ("В основном облачно", "☁️"),
    ("Переменная облачность в течение дня", "⛅"),
    ("В основном облачно в течение дня", "☁️"),
    ("Пасмурно в течение дня", "☁️"),
    ("Частично облачно", "⛅"),
    ("Туман", "🌫️"),
    ("Дымка", "🌫️"),
    ("Туманно утром", "🌫️"),
    ("Дождь", "🌧️"),
    ("Небольшой дождь", "🌦️"),
    ("Сильный дождь", "⛈️"),
    ("Дождь, Переменная облачность", "🌦️"),
    ("Дождь, Пасмурно", "🌧️"),
    ("Морось", "🌦️"),
    ("Возможен небольшой дождь до вечера", "🌦️"),
    ("Небольшой дождь в течение дня", "🌦️"),
    ("Дождь в течение дня", "🌧️"),
    ("Снег", "❄️"),
    ("Небольшой снег", "🌨️"),
    ("Сильный снег", "❄️❄️"),
    ("Снег в течение дня", "❄️"),
    ("Гроза", "⛈️"),
    ("Град", "🧊"),
    ("Мокрый снег", "🌨️💧"),
    ("Ветрено", "💨"),
    ("Порывистый ветер", "💨"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Translate an English condition into Russian; unknown text is returned as is.
pub fn translate(condition: &str) -> String {
    lookup(TRANSLATIONS, condition)
        .unwrap_or(condition)
        .to_string()
}

/// Pick an icon glyph for a condition description in Russian or English.
pub fn icon_for(condition: &str) -> &'static str {
    if condition.is_empty() || condition == "Unknown" {
        return DEFAULT_ICON;
    }

    if let Some(icon) = lookup(ICONS_RU, condition).or_else(|| lookup(ICONS_EN, condition)) {
        debug!(condition, icon, "icon from table");
        return icon;
    }

    let text = condition.to_lowercase();
    let light = ["небольш", "легк", "light"];

    let icon = if contains_any(&text, &["ясн", "солн", "clear", "sun"]) {
        "☀️"
    } else if contains_any(&text, &["переменн", "частичн", "partial", "partly"]) {
        "⛅"
    } else if contains_any(&text, &["облачн", "пасмурн", "cloud", "overcast"]) {
        "☁️"
    } else if contains_any(&text, &["туман", "дымк", "fog", "mist", "haze"]) {
        "🌫️"
    } else if contains_any(&text, &["дожд", "морос", "rain", "drizzle"]) {
        if contains_any(&text, &light) {
            "🌦️"
        } else if contains_any(&text, &["сильн", "ливень", "heavy", "shower"]) {
            "⛈️"
        } else {
            "🌧️"
        }
    } else if contains_any(&text, &["снег", "snow"]) {
        if contains_any(&text, &light) { "🌨️" } else { "❄️" }
    } else if contains_any(&text, &["гроз", "гром", "thunder"]) {
        "⛈️"
    } else if contains_any(&text, &["град", "лед", "hail", "ice"]) {
        "🧊"
    } else if contains_any(&text, &["ветр", "wind"]) {
        "💨"
    } else {
        debug!(condition, "no icon matched, using default");
        DEFAULT_ICON
    };

    debug!(condition, icon, "icon from keywords");
    icon
}
