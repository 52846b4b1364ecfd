use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One game as returned by the odds provider's `/sports/{sport}/odds` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sport_key: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsBookmaker {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markets: Vec<OddsMarket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OddsOutcome>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsOutcome {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub point: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn parse_odds_events_json(raw: &str) -> Result<Vec<OddsEvent>> {
    serde_json::from_str(raw).context("invalid odds json")
}

impl OddsEvent {
    pub fn event_name(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    /// Markets with `market_key` across every bookmaker, in payload order.
    pub fn markets_with_key<'a>(&'a self, market_key: &'a str) -> impl Iterator<Item = &'a OddsMarket> + 'a {
        self.bookmakers
            .iter()
            .flat_map(|b| b.markets.iter())
            .filter(move |m| m.key == market_key)
    }
}
