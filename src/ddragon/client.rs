//! HTTP client for the Data Dragon CDN.
//!
//! One GET per entity kind per sync pass. Champions use the consolidated
//! `championFull.json` payload so spells, tips and skins arrive in the same
//! fetch as the summary data.
//!
//! Retry policy:
//! - transport errors and 5xx answers retry with exponential backoff, up to
//!   the configured attempt bound
//! - 404 means the version is not published and fails fast
//! - a body that is not valid JSON fails fast (retrying a deterministic
//!   parse failure wastes time)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Args;
use crate::model::EntityKind;
use crate::types::{DragonholdError, Result};

/// Upstream data source for the sync engine (mockable in tests)
#[async_trait]
pub trait DataDragonApi: Send + Sync {
    /// Fetch the upstream version list, ordered newest-first
    async fn versions(&self) -> Result<Vec<String>>;

    /// Fetch the raw payload for one entity kind at one version
    async fn fetch(&self, kind: EntityKind, version: &str) -> Result<Value>;
}

/// Configuration for the reqwest-backed client
#[derive(Debug, Clone)]
pub struct HttpDataDragonConfig {
    /// Version-list root, e.g. "https://ddragon.leagueoflegends.com/api"
    pub api_url: String,
    /// Versioned-data root, e.g. "https://ddragon.leagueoflegends.com/cdn"
    pub cdn_url: String,
    pub language: String,
    pub timeout: Duration,
    /// Total attempts per fetch, transient failures only
    pub attempts: u32,
    /// Delay before the first retry; doubles per attempt
    pub backoff_base: Duration,
}

impl Default for HttpDataDragonConfig {
    fn default() -> Self {
        Self {
            api_url: "https://ddragon.leagueoflegends.com/api".to_string(),
            cdn_url: "https://ddragon.leagueoflegends.com/cdn".to_string(),
            language: "en_US".to_string(),
            timeout: Duration::from_secs(30),
            attempts: 3,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl HttpDataDragonConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            api_url: args.api_url(),
            cdn_url: args.cdn_url(),
            language: args.language.clone(),
            timeout: Duration::from_millis(args.fetch_timeout_ms),
            attempts: args.fetch_attempts,
            ..Self::default()
        }
    }
}

/// reqwest-backed Data Dragon client
pub struct HttpDataDragon {
    config: HttpDataDragonConfig,
    client: reqwest::Client,
}

impl HttpDataDragon {
    pub fn new(config: HttpDataDragonConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Payload filename for one entity kind
    fn resource(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Champions => "championFull.json",
            EntityKind::Items => "item.json",
            EntityKind::Runes => "runesReforged.json",
            EntityKind::SummonerSpells => "summoner.json",
        }
    }

    /// GET a JSON document with retry/backoff on transient failures.
    ///
    /// `version` tags 404s with the missing version; None for the version
    /// list itself, where a 404 is just an unreachable upstream.
    async fn get_json(&self, url: &str, resource: &str, version: Option<&str>) -> Result<Value> {
        let mut delay = self.config.backoff_base;
        let mut last_error = String::new();

        for attempt in 1..=self.config.attempts {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::NOT_FOUND {
                        if let Some(version) = version {
                            return Err(DragonholdError::VersionNotFound {
                                version: version.to_string(),
                                resource: resource.to_string(),
                            });
                        }
                        return Err(DragonholdError::UpstreamUnavailable(format!(
                            "{resource} not found at {url}"
                        )));
                    }

                    if status.is_server_error() {
                        last_error = format!("upstream answered {status}");
                    } else if !status.is_success() {
                        return Err(DragonholdError::UpstreamUnavailable(format!(
                            "unexpected status {status} for {url}"
                        )));
                    } else {
                        let body = response.text().await.map_err(|e| {
                            DragonholdError::UpstreamUnavailable(format!(
                                "failed reading body for {resource}: {e}"
                            ))
                        })?;

                        return serde_json::from_str(&body).map_err(|e| {
                            DragonholdError::MalformedUpstreamData(format!("{resource}: {e}"))
                        });
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt < self.config.attempts {
                warn!(
                    resource = %resource,
                    attempt = attempt,
                    error = %last_error,
                    "Upstream fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(DragonholdError::UpstreamUnavailable(format!(
            "{resource}: {last_error} ({} attempts)",
            self.config.attempts
        )))
    }
}

#[async_trait]
impl DataDragonApi for HttpDataDragon {
    async fn versions(&self) -> Result<Vec<String>> {
        let url = format!("{}/versions.json", self.config.api_url);
        let value = self.get_json(&url, "versions.json", None).await?;

        serde_json::from_value(value).map_err(|e| {
            DragonholdError::MalformedUpstreamData(format!("versions.json: {e}"))
        })
    }

    async fn fetch(&self, kind: EntityKind, version: &str) -> Result<Value> {
        let resource = Self::resource(kind);
        let url = format!(
            "{}/{}/data/{}/{}",
            self.config.cdn_url, version, self.config.language, resource
        );

        debug!(entity = %kind, version = %version, url = %url, "Fetching upstream payload");
        self.get_json(&url, resource, Some(version)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_map_one_payload_per_kind() {
        assert_eq!(HttpDataDragon::resource(EntityKind::Champions), "championFull.json");
        assert_eq!(HttpDataDragon::resource(EntityKind::Items), "item.json");
        assert_eq!(HttpDataDragon::resource(EntityKind::Runes), "runesReforged.json");
        assert_eq!(HttpDataDragon::resource(EntityKind::SummonerSpells), "summoner.json");
    }

    #[test]
    fn config_derives_urls_from_args() {
        use clap::Parser;
        let args = crate::config::Args::parse_from([
            "dragonhold",
            "--ddragon-url",
            "http://localhost:9000",
            "--fetch-attempts",
            "5",
        ]);
        let config = HttpDataDragonConfig::from_args(&args);
        assert_eq!(config.api_url, "http://localhost:9000/api");
        assert_eq!(config.cdn_url, "http://localhost:9000/cdn");
        assert_eq!(config.attempts, 5);
    }
}
