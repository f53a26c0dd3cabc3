use std::{path::Path, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use cityweather_core::{
    ErrorReply, ImageProbe, WeatherService, WidgetView,
    background::any_gradient,
    widget::{Decorations, resolve_background, resolve_flag},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::error;

use crate::render;

pub const FETCH_FAILED: &str = "Не удалось получить данные о погоде";

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub photo_probe: Arc<dyn ImageProbe>,
    pub flag_probe: Arc<dyn ImageProbe>,
    pub photo_base: String,
    pub refresh_secs: u64,
}

pub fn create_router(state: AppState, flags_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/weather/random", get(random_weather))
        .nest_service("/static/flags", ServeDir::new(flags_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn random_weather(State(state): State<AppState>) -> Response {
    match state.service.random_report().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = %err, "random weather failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorReply {
                    error: FETCH_FAILED.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Server-rendered widget page; the browser reloads it every poll interval.
async fn index(State(state): State<AppState>) -> Html<String> {
    let mut view = WidgetView::default();

    match state.service.random_report().await {
        Ok(report) => {
            let decorations = Decorations::random(&state.photo_base, &report.city_name);
            let background = resolve_background(decorations, state.photo_probe.as_ref()).await;
            let flag = resolve_flag(&report.country_code, state.flag_probe.as_ref()).await;
            view.apply_report(&report, background, flag);
        }
        Err(err) => {
            error!(error = %err, "widget page fetch failed");
            view.show_error(any_gradient());
        }
    }

    Html(render::html_page(&view, state.refresh_secs))
}
