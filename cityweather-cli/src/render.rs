//! Human-friendly output of a [`WidgetView`]: a terminal card and an HTML page.

use cityweather_core::{Background, Tone, WidgetView};
use colored::{ColoredString, Colorize};

/// Temperature text in the colour of its tone.
fn tinted(text: &str, tone: Option<Tone>) -> ColoredString {
    match tone {
        Some(Tone::Positive) => text.red(),
        Some(Tone::Negative) => text.blue(),
        None => text.normal(),
    }
}

pub fn terminal_card(view: &WidgetView) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}, {}\n", view.icon, view.city_name, view.country_name));

    out.push_str(&format!("  {}", tinted(&view.temperature, view.tone).bold()));
    if !view.feels_like.is_empty() {
        out.push_str(&format!(
            "  (ощущается как {})",
            tinted(&view.feels_like, view.tone)
        ));
    }
    out.push('\n');

    out.push_str(&format!("  {}\n", view.conditions));
    if !view.humidity.is_empty() {
        out.push_str(&format!("  Влажность: {}%\n", view.humidity));
    }
    if let Some(flag) = &view.flag {
        out.push_str(&format!("  Флаг: {flag}\n"));
    }
    match &view.background {
        Background::Photo(url) => out.push_str(&format!("  Фон: {url}\n")),
        Background::Gradient(gradient) => out.push_str(&format!("  Фон: {gradient}\n")),
    }
    if let Some(at) = view.updated_at {
        out.push_str(&format!("  Обновлено: {}\n", at.format("%H:%M:%S")));
    }

    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Complete widget page. `refresh_secs` drives the browser's reload.
pub fn html_page(view: &WidgetView, refresh_secs: u64) -> String {
    let tone = view.tone.map(Tone::css_class).unwrap_or("");
    let flag = view
        .flag
        .as_deref()
        .map(|src| format!(r#"<img class="flag" src="{}" alt="flag">"#, escape(src)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh_secs}">
<title>{city}</title>
</head>
<body>
<div id="background" style="background-image: {background}; background-size: cover;">
<div class="weather-card">
<div id="flag">{flag}</div>
<h1 id="city-name">{city}</h1>
<h2 id="country-name">{country}</h2>
<div id="temperature" class="{tone}">{temperature}</div>
<div class="feels {tone}">Ощущается как <span id="feels-like">{feels_like}</span></div>
<div id="weather-icon">{icon}</div>
<div id="conditions">{conditions}</div>
<div>Влажность: <span id="humidity">{humidity}</span>%</div>
</div>
</div>
</body>
</html>
"#,
        background = escape(&view.background.css()),
        city = escape(&view.city_name),
        country = escape(&view.country_name),
        temperature = escape(&view.temperature),
        feels_like = escape(&view.feels_like),
        icon = escape(&view.icon),
        conditions = escape(&view.conditions),
        humidity = escape(&view.humidity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_view() -> WidgetView {
        let mut view = WidgetView::default();
        view.show_error("linear-gradient(135deg, #667eea 0%, #764ba2 100%)".into());
        view
    }

    #[test]
    fn terminal_card_shows_placeholders() {
        let card = terminal_card(&error_view());
        assert!(card.contains("Ошибка загрузки, ---"));
        assert!(card.contains("--°C"));
        assert!(card.contains("Нет данных"));
        assert!(!card.contains("Влажность"));
    }

    #[test]
    fn temperature_colour_follows_tone() {
        assert_eq!(tinted("+5°C", Some(Tone::Positive)), "+5°C".red());
        assert_eq!(tinted("-3°C", Some(Tone::Negative)), "-3°C".blue());
        assert_eq!(tinted("--°C", None), "--°C".normal());
    }

    #[test]
    fn html_escapes_and_refreshes() {
        let mut view = error_view();
        view.city_name = "<script>".into();

        let page = html_page(&view, 30);
        assert!(page.contains(r#"content="30""#));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn html_photo_background_is_quoted() {
        let mut view = WidgetView::default();
        view.background = Background::Photo("https://img.example/?a b".into());

        let page = html_page(&view, 30);
        assert!(page.contains("url(&#39;https://img.example/?a b&#39;)"));
    }
}
