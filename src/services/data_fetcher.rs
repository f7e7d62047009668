use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::models::{NormalizedMatch, Sport};
use crate::services::cache::TtlCache;
use crate::services::normalizer::{fallback_match, normalize, normalize_live};

/// Pulls scoreboards from the live feed and normalizes them.
///
/// Feed failures never reach callers: a bad status, a transport error or a
/// body that is not JSON all end in the sport's fallback record.
pub struct DataFetcher {
    client: Client,
    base_url: String,
    match_cache: TtlCache<(Sport, String), NormalizedMatch>,
    live_cache: TtlCache<Sport, Vec<NormalizedMatch>>,
}

impl DataFetcher {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.feed_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.feed_base_url.trim_end_matches('/').to_string(),
            match_cache: TtlCache::new(config.cache_ttl),
            live_cache: TtlCache::new(config.cache_ttl),
        }
    }

    pub fn scoreboard_url(&self, sport: Sport) -> String {
        format!("{}/{}/scoreboard", self.base_url, sport.feed_path())
    }

    /// Raw scoreboard payload for a sport.
    pub async fn fetch_scoreboard(&self, sport: Sport) -> Result<Value> {
        let url = self.scoreboard_url(sport);
        tracing::debug!("Fetching {} scoreboard from {}", sport, url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Feed API error {}: {}", status, body));
        }

        Ok(response.json().await?)
    }

    /// Live record for a match, served from the cache while fresh.
    ///
    /// The feed is not queried by id: the first in-progress event of the
    /// sport's scoreboard is what gets normalized and cached under `match_id`.
    pub async fn get_live_match_data(&self, sport: Sport, match_id: &str) -> NormalizedMatch {
        self.match_cache
            .get_or_insert_with((sport, match_id.to_string()), || self.fetch_match_data(sport))
            .await
    }

    /// Uncached fetch + normalize.
    pub async fn fetch_match_data(&self, sport: Sport) -> NormalizedMatch {
        match self.fetch_scoreboard(sport).await {
            Ok(payload) => normalize(sport, &payload),
            Err(e) => {
                tracing::error!("Error fetching {} data: {}", sport, e);
                fallback_match(sport)
            }
        }
    }

    /// All live records for a sport, served from the cache while fresh.
    pub async fn get_live_matches(&self, sport: Sport) -> Vec<NormalizedMatch> {
        self.live_cache
            .get_or_insert_with(sport, || async move {
                match self.fetch_scoreboard(sport).await {
                    Ok(payload) => normalize_live(sport, &payload),
                    Err(e) => {
                        tracing::error!("Error fetching live {} matches: {}", sport, e);
                        Vec::new()
                    }
                }
            })
            .await
    }

    pub fn purge_expired(&self) -> usize {
        self.match_cache.purge_expired() + self.live_cache.purge_expired()
    }

    /// Entries currently held across both caches, expired or not.
    pub fn cached_entries(&self) -> usize {
        self.match_cache.len() + self.live_cache.len()
    }
}
