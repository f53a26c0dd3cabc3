use std::{future::Future, sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::{
    background::{Background, any_gradient},
    client::{FetchError, WidgetClient},
    model::WeatherReport,
    widget::{Decorations, ImageProbe, WidgetView, resolve_background, resolve_flag},
};

/// Result of one fetch, ready to be applied to the view.
#[derive(Debug)]
pub enum Update {
    Report {
        report: WeatherReport,
        background: Background,
        flag: String,
    },
    Failed {
        error: FetchError,
        gradient: String,
    },
}

impl Update {
    pub fn apply(self, view: &mut WidgetView) {
        match self {
            Update::Report {
                report,
                background,
                flag,
            } => view.apply_report(&report, background, flag),
            Update::Failed { error, gradient } => {
                error!(%error, "weather update failed");
                view.show_error(gradient);
            }
        }
    }
}

/// Periodically refreshes a [`WidgetView`].
///
/// Every tick starts its own fetch; a slow fetch is not awaited before the next
/// one starts. Results are applied in the order they arrive, so whichever
/// finishes last wins.
#[derive(Debug, Clone)]
pub struct Poller {
    client: Arc<WidgetClient>,
    probe: Arc<dyn ImageProbe>,
    photo_base: String,
    interval: Duration,
}

impl Poller {
    pub fn new(
        client: WidgetClient,
        probe: Arc<dyn ImageProbe>,
        photo_base: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            client: Arc::new(client),
            probe,
            photo_base: photo_base.into(),
            interval,
        }
    }

    /// One fetch plus image resolution.
    pub async fn update(&self) -> Update {
        fetch_update(&self.client, self.probe.as_ref(), &self.photo_base).await
    }

    /// Render immediately, then once per interval, until `shutdown` completes.
    ///
    /// Fetches still in flight when `shutdown` completes are aborted.
    pub async fn run<F, S>(self, mut render: F, shutdown: S) -> WidgetView
    where
        F: FnMut(&WidgetView),
        S: Future<Output = ()>,
    {
        let mut view = WidgetView::default();
        tokio::pin!(shutdown);

        tokio::select! {
            _ = &mut shutdown => {
                info!("polling stopped before the first update");
                return view;
            }
            update = self.update() => {
                update.apply(&mut view);
                render(&view);
            }
        }

        let mut fetches: JoinSet<Update> = JoinSet::new();
        let mut ticker = tokio::time::interval(self.interval);
        // the first tick fires immediately and the initial update already ran
        ticker.tick().await;

        info!(endpoint = self.client.endpoint(), interval = ?self.interval, "polling started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let client = self.client.clone();
                    let probe = self.probe.clone();
                    let photo_base = self.photo_base.clone();
                    fetches.spawn(async move {
                        fetch_update(&client, probe.as_ref(), &photo_base).await
                    });
                }
                Some(joined) = fetches.join_next() => match joined {
                    Ok(update) => {
                        update.apply(&mut view);
                        render(&view);
                    }
                    Err(err) => warn!(error = %err, "weather fetch task failed"),
                },
            }
        }

        info!(in_flight = fetches.len(), "polling stopped");
        view
    }
}

async fn fetch_update(client: &WidgetClient, probe: &dyn ImageProbe, photo_base: &str) -> Update {
    match client.fetch().await {
        Ok(report) => {
            let decorations = Decorations::random(photo_base, &report.city_name);
            let background = resolve_background(decorations, probe).await;
            let flag = resolve_flag(&report.country_code, probe).await;
            Update::Report {
                report,
                background,
                flag,
            }
        }
        Err(error) => Update::Failed {
            error,
            gradient: any_gradient(),
        },
    }
}
