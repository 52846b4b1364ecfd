use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EvError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    PrizePicks,
    Underdog,
    Fliff,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::PrizePicks, Platform::Underdog, Platform::Fliff];

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::PrizePicks => "PrizePicks",
            Platform::Underdog => "Underdog",
            Platform::Fliff => "Fliff",
        }
    }

    /// Bookmaker key used by the upstream odds provider.
    pub fn bookmaker_key(self) -> &'static str {
        match self {
            Platform::PrizePicks => "prizepicks",
            Platform::Underdog => "underdog",
            Platform::Fliff => "fliff",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = EvError;

    fn from_str(raw: &str) -> Result<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.bookmaker_key() == key)
            .ok_or_else(|| EvError::UnknownPlatform(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverUnder {
    Over,
    Under,
}

impl OverUnder {
    pub fn as_str(self) -> &'static str {
        match self {
            OverUnder::Over => "over",
            OverUnder::Under => "under",
        }
    }
}

impl fmt::Display for OverUnder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverUnder {
    type Err = EvError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "over" => Ok(OverUnder::Over),
            "under" => Ok(OverUnder::Under),
            _ => Err(EvError::InvalidOverUnder(raw.to_string())),
        }
    }
}

/// Inputs for [`Line::new`]. `scraped_at` falls back to the current time.
#[derive(Debug, Clone)]
pub struct LineFields {
    pub sportsbook: String,
    pub sport: String,
    pub league: String,
    pub event_name: String,
    pub player_name: String,
    pub market_type: String,
    pub line_value: f64,
    pub odds: i32,
    pub over_under: String,
    pub event_date: DateTime<Utc>,
    pub scraped_at: Option<DateTime<Utc>>,
}

/// One canonical betting line. Only constructible through validation, so any
/// `Line` in hand has a finite threshold, non-zero odds and a known side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineRecord", into = "LineRecord")]
pub struct Line {
    sportsbook: String,
    sport: String,
    league: String,
    event_name: String,
    player_name: String,
    market_type: String,
    line_value: f64,
    odds: i32,
    over_under: OverUnder,
    event_date: DateTime<Utc>,
    scraped_at: DateTime<Utc>,
    unique_id: String,
}

impl Line {
    pub fn new(fields: LineFields) -> Result<Self> {
        if !fields.line_value.is_finite() {
            return Err(EvError::InvalidLineValue(fields.line_value));
        }
        if fields.odds == 0 {
            return Err(EvError::InvalidOdds {
                value: 0.0,
                reason: "american odds of 0 are undefined",
            });
        }
        if fields.player_name.trim().is_empty() {
            return Err(EvError::MissingField("player_name"));
        }
        let over_under: OverUnder = fields.over_under.parse()?;
        let unique_id = unique_id(
            &fields.sportsbook,
            &fields.sport,
            &fields.player_name,
            &fields.market_type,
            fields.line_value,
            over_under,
        );

        Ok(Self {
            sportsbook: fields.sportsbook,
            sport: fields.sport,
            league: fields.league,
            event_name: fields.event_name,
            player_name: fields.player_name,
            market_type: fields.market_type,
            line_value: fields.line_value,
            odds: fields.odds,
            over_under,
            event_date: fields.event_date,
            scraped_at: fields.scraped_at.unwrap_or_else(Utc::now),
            unique_id,
        })
    }

    pub fn sportsbook(&self) -> &str {
        &self.sportsbook
    }

    pub fn sport(&self) -> &str {
        &self.sport
    }

    pub fn league(&self) -> &str {
        &self.league
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn market_type(&self) -> &str {
        &self.market_type
    }

    pub fn line_value(&self) -> f64 {
        self.line_value
    }

    pub fn odds(&self) -> i32 {
        self.odds
    }

    pub fn over_under(&self) -> OverUnder {
        self.over_under
    }

    pub fn event_date(&self) -> DateTime<Utc> {
        self.event_date
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

fn unique_id(
    sportsbook: &str,
    sport: &str,
    player_name: &str,
    market_type: &str,
    line_value: f64,
    over_under: OverUnder,
) -> String {
    format!(
        "{sportsbook}_{sport}_{player_name}_{market_type}_{}_{over_under}",
        format_line_value(line_value)
    )
    .replace(' ', "_")
    .to_lowercase()
}

/// Whole thresholds keep a trailing `.0` so `25` and `25.0` share one key.
fn format_line_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

// Wire form of a line. The stored unique_id is ignored on read and derived again.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineRecord {
    sportsbook: String,
    sport: String,
    league: String,
    event_name: String,
    player_name: String,
    market_type: String,
    line_value: f64,
    odds: i32,
    over_under: String,
    event_date: DateTime<Utc>,
    #[serde(default)]
    scraped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    unique_id: String,
}

impl TryFrom<LineRecord> for Line {
    type Error = EvError;

    fn try_from(rec: LineRecord) -> Result<Self> {
        Line::new(LineFields {
            sportsbook: rec.sportsbook,
            sport: rec.sport,
            league: rec.league,
            event_name: rec.event_name,
            player_name: rec.player_name,
            market_type: rec.market_type,
            line_value: rec.line_value,
            odds: rec.odds,
            over_under: rec.over_under,
            event_date: rec.event_date,
            scraped_at: rec.scraped_at,
        })
    }
}

impl From<Line> for LineRecord {
    fn from(line: Line) -> Self {
        Self {
            sportsbook: line.sportsbook,
            sport: line.sport,
            league: line.league,
            event_name: line.event_name,
            player_name: line.player_name,
            market_type: line.market_type,
            line_value: line.line_value,
            odds: line.odds,
            over_under: line.over_under.as_str().to_string(),
            event_date: line.event_date,
            scraped_at: Some(line.scraped_at),
            unique_id: line.unique_id,
        }
    }
}
