//! Country flag assets: URL layout, local lookup and the downloader that fills
//! the flags directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

use crate::{cities::CityCatalog, widget::ImageProbe};

/// URL prefix under which the flags directory is served.
pub const FLAGS_URL_PREFIX: &str = "/static/flags/";
pub const FALLBACK_FLAG_FILE: &str = "fallback.svg";
pub const FALLBACK_FLAG_PATH: &str = "/static/flags/fallback.svg";

const FALLBACK_FLAG_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="240" viewBox="0 0 320 240">
  <rect width="320" height="240" fill="#808080"/>
  <rect x="10" y="10" width="300" height="220" fill="none" stroke="#ffffff" stroke-width="2"/>
  <text x="160" y="120" fill="#ffffff" font-family="Arial, sans-serif" font-size="80" text-anchor="middle" dominant-baseline="central">?</text>
</svg>
"##;

/// Flag URL for a country code, e.g. `/static/flags/fr.png`.
pub fn flag_path(country_code: &str) -> String {
    format!("{FLAGS_URL_PREFIX}{}.png", country_code.to_lowercase())
}

/// Probe that answers for flag URLs by looking at a local directory.
#[derive(Debug, Clone)]
pub struct DirImageProbe {
    dir: PathBuf,
}

impl DirImageProbe {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(FLAGS_URL_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.dir.join(name))
    }
}

#[async_trait]
impl ImageProbe for DirImageProbe {
    async fn is_available(&self, url: &str) -> bool {
        match self.local_path(url) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub errors: usize,
}

/// Fetches a PNG flag for every country in the catalog.
#[derive(Debug, Clone)]
pub struct FlagDownloader {
    http: Client,
    sources: Vec<String>,
}

impl FlagDownloader {
    /// Source templates; `{code}` is the lowercase code, `{CODE}` the uppercase one.
    pub fn default_sources() -> Vec<String> {
        vec![
            "https://flagcdn.com/w320/{code}.png".to_string(),
            "https://flagsapi.com/{CODE}/flat/64.png".to_string(),
            "https://www.worldometers.info/img/flags/{code}-flag.gif".to_string(),
        ]
    }

    pub fn new() -> Result<Self> {
        Self::with_sources(Self::default_sources())
    }

    pub fn with_sources(sources: Vec<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for flag downloads")?;

        Ok(Self { http, sources })
    }

    pub async fn download_all(&self, catalog: &CityCatalog, dir: &Path) -> Result<DownloadSummary> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create flags directory: {}", dir.display()))?;

        let codes = catalog.country_codes();
        info!(countries = codes.len(), dir = %dir.display(), "downloading flags");

        let mut summary = DownloadSummary::default();
        for code in &codes {
            let target = dir.join(format!("{code}.png"));

            if tokio::fs::try_exists(&target).await.unwrap_or(false) {
                debug!(code, "flag already present");
                summary.downloaded += 1;
                continue;
            }

            match self.fetch_flag(code).await {
                Some(bytes) => {
                    tokio::fs::write(&target, bytes).await.with_context(|| {
                        format!("Failed to write flag file: {}", target.display())
                    })?;
                    info!(code, "flag downloaded");
                    summary.downloaded += 1;
                }
                None => {
                    warn!(code, "no source had a flag");
                    summary.errors += 1;
                }
            }
        }

        write_fallback_flag(dir).await?;

        info!(
            downloaded = summary.downloaded,
            errors = summary.errors,
            "flag download finished"
        );
        Ok(summary)
    }

    async fn fetch_flag(&self, code: &str) -> Option<Vec<u8>> {
        for template in &self.sources {
            let url = template
                .replace("{code}", code)
                .replace("{CODE}", &code.to_uppercase());

            let res = match self.http.get(&url).send().await {
                Ok(res) if res.status().is_success() => res,
                Ok(res) => {
                    debug!(url, status = %res.status(), "flag source refused");
                    continue;
                }
                Err(err) => {
                    debug!(url, error = %err, "flag source unreachable");
                    continue;
                }
            };

            match res.bytes().await {
                Ok(bytes) => return Some(bytes.to_vec()),
                Err(err) => debug!(url, error = %err, "failed to read flag body"),
            }
        }
        None
    }
}

/// Write the placeholder flag shown when a country has no flag file.
pub async fn write_fallback_flag(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(FALLBACK_FLAG_FILE);
    tokio::fs::write(&path, FALLBACK_FLAG_SVG)
        .await
        .with_context(|| format!("Failed to write fallback flag: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::City;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn city(name: &str, code: &str) -> City {
        City {
            name: name.into(),
            country: name.into(),
            country_code: code.into(),
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn flag_path_is_lowercase() {
        assert_eq!(flag_path("FR"), "/static/flags/fr.png");
    }

    #[tokio::test]
    async fn dir_probe_checks_local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fr.png"), b"png").unwrap();
        let probe = DirImageProbe::new(dir.path());

        assert!(probe.is_available("/static/flags/fr.png").await);
        assert!(!probe.is_available("/static/flags/de.png").await);
        assert!(!probe.is_available("/static/flags/../secret").await);
        assert!(!probe.is_available("https://elsewhere/fr.png").await);
    }

    #[tokio::test]
    async fn downloads_missing_flags_and_writes_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/primary/fr.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"FR".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/secondary/JP.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JP".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("no.png"), b"already here").unwrap();

        let downloader = FlagDownloader::with_sources(vec![
            format!("{}/primary/{{code}}.png", server.uri()),
            format!("{}/secondary/{{CODE}}.png", server.uri()),
        ])
        .unwrap();

        let catalog = CityCatalog::new(vec![
            city("Paris", "FR"),
            city("Tokyo", "JP"),
            city("Oslo", "NO"),
            city("Nowhere", "XX"),
        ])
        .unwrap();

        let summary = downloader.download_all(&catalog, dir.path()).await.unwrap();

        assert_eq!(summary, DownloadSummary { downloaded: 3, errors: 1 });
        assert_eq!(std::fs::read(dir.path().join("fr.png")).unwrap(), b"FR");
        assert_eq!(std::fs::read(dir.path().join("jp.png")).unwrap(), b"JP");
        assert_eq!(std::fs::read(dir.path().join("no.png")).unwrap(), b"already here");
        assert!(!dir.path().join("xx.png").exists());

        let fallback = std::fs::read_to_string(dir.path().join(FALLBACK_FLAG_FILE)).unwrap();
        assert!(fallback.contains("<svg"));
    }
}
