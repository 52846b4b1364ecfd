use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::http_client::get_text;
use crate::line::Platform;
use crate::payload::{OddsEvent, parse_odds_events_json};

const DFS_REGION: &str = "us_dfs";

/// Where the pipeline gets its games from. The live implementation is
/// [`OddsApiClient`]; tests plug in fixtures.
pub trait OddsSource {
    /// Games carrying `platform`'s own lines for `sport_key`.
    fn dfs_events(&self, sport_key: &str, platform: Platform) -> Result<Vec<OddsEvent>>;

    /// Games carrying regulated-book prices for one player market.
    fn market_events(&self, sport_key: &str, market_key: &str) -> Result<Vec<OddsEvent>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SportSummary {
    pub key: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct OddsApiClient {
    base_url: String,
    api_key: String,
    market_regions: String,
}

impl OddsApiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, market_regions: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            market_regions: market_regions.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            cfg.require_api_key()?,
            cfg.odds_api_base_url.clone(),
            cfg.market_regions.clone(),
        ))
    }

    pub fn sports(&self) -> Result<Vec<SportSummary>> {
        let body = self.get(&format!("{}/sports", self.base_url), &[])?;
        serde_json::from_str(&body).context("invalid sports json")
    }

    pub fn odds(&self, sport_key: &str, params: &[(&str, &str)]) -> Result<Vec<OddsEvent>> {
        let mut query = vec![("oddsFormat", "american"), ("dateFormat", "iso")];
        query.extend_from_slice(params);
        let body = self.get(&format!("{}/sports/{sport_key}/odds", self.base_url), &query)?;
        parse_odds_events_json(&body)
    }

    fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let mut query = vec![("apiKey", self.api_key.as_str())];
        query.extend_from_slice(params);
        get_text(url, &query).context("odds request failed")
    }
}

impl OddsSource for OddsApiClient {
    fn dfs_events(&self, sport_key: &str, platform: Platform) -> Result<Vec<OddsEvent>> {
        self.odds(
            sport_key,
            &[("regions", DFS_REGION), ("bookmakers", platform.bookmaker_key())],
        )
        .with_context(|| format!("{platform} lines for {sport_key}"))
    }

    fn market_events(&self, sport_key: &str, market_key: &str) -> Result<Vec<OddsEvent>> {
        self.odds(
            sport_key,
            &[("regions", self.market_regions.as_str()), ("markets", market_key)],
        )
        .with_context(|| format!("{market_key} market odds for {sport_key}"))
    }
}
