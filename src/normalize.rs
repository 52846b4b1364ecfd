use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{EvError, Result};
use crate::line::{Line, LineFields, OverUnder, Platform};
use crate::payload::{OddsEvent, OddsMarket, OddsOutcome};

const PLAYER_MARKET_PREFIX: &str = "player_";
const ALTERNATE_MARKET_SUFFIX: &str = "_alternate";

/// Game-level context shared by every line built from one event.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub sport_key: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
}

impl GameContext {
    pub fn from_event(sport_key: &str, event: &OddsEvent) -> Result<Self> {
        let raw = event.commence_time.as_deref().unwrap_or_default();
        let event_date =
            parse_timestamp(raw).ok_or_else(|| EvError::InvalidEventDate(raw.to_string()))?;
        Ok(Self {
            sport_key: sport_key.to_string(),
            event_name: event.event_name(),
            event_date,
        })
    }
}

#[derive(Debug, Default)]
pub struct NormalizedLines {
    pub lines: Vec<Line>,
    pub rejected: Vec<EvError>,
}

pub fn sport_display_name(sport_key: &str) -> String {
    match sport_key {
        "basketball_nba" => "NBA".to_string(),
        "americanfootball_nfl" => "NFL".to_string(),
        "baseball_mlb" => "MLB".to_string(),
        "icehockey_nhl" => "NHL".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn market_type_from_key(market_key: &str) -> String {
    let key = market_key.strip_prefix(PLAYER_MARKET_PREFIX).unwrap_or(market_key);
    let key = key.strip_suffix(ALTERNATE_MARKET_SUFFIX).unwrap_or(key);
    key.to_string()
}

/// Under wins over over when both appear; single-sided text reads as over.
pub fn infer_over_under(description: &str) -> OverUnder {
    let text = description.to_lowercase();
    if text.contains("under") || text.contains("less") {
        OverUnder::Under
    } else {
        OverUnder::Over
    }
}

/// Lines for one market. Outcomes without a player or threshold are skipped;
/// outcomes with unusable prices come back as errors.
pub fn normalize_market(
    platform: Platform,
    ctx: &GameContext,
    market: &OddsMarket,
) -> Vec<Result<Line>> {
    let market_type = market_type_from_key(&market.key);
    let sport = sport_display_name(&ctx.sport_key);

    market
        .outcomes
        .iter()
        .filter_map(|outcome| {
            let (player_name, side_text) = split_player_and_side(outcome);
            let line_value = outcome.point?;
            if player_name.is_empty() {
                return None;
            }
            Some(american_price(outcome.price).and_then(|odds| {
                Line::new(LineFields {
                    sportsbook: platform.display_name().to_string(),
                    sport: sport.clone(),
                    league: sport.clone(),
                    event_name: ctx.event_name.clone(),
                    player_name: player_name.to_string(),
                    market_type: market_type.clone(),
                    line_value,
                    odds,
                    over_under: infer_over_under(side_text).to_string(),
                    event_date: ctx.event_date,
                    scraped_at: None,
                })
            }))
        })
        .collect()
}

/// Walks a platform's player-prop markets across a set of games.
pub fn normalize_events(platform: Platform, sport_key: &str, events: &[OddsEvent]) -> NormalizedLines {
    let mut out = NormalizedLines::default();

    for event in events {
        let books: Vec<_> = event
            .bookmakers
            .iter()
            .filter(|b| b.key == platform.bookmaker_key())
            .collect();
        let has_player_markets = books
            .iter()
            .any(|b| b.markets.iter().any(|m| m.key.contains("player")));
        if !has_player_markets {
            continue;
        }

        let ctx = match GameContext::from_event(sport_key, event) {
            Ok(ctx) => ctx,
            Err(err) => {
                out.rejected.push(err);
                continue;
            }
        };

        for market in books
            .iter()
            .flat_map(|b| b.markets.iter())
            .filter(|m| m.key.contains("player"))
        {
            for result in normalize_market(platform, &ctx, market) {
                match result {
                    Ok(line) => out.lines.push(line),
                    Err(err) => out.rejected.push(err),
                }
            }
        }
    }

    out
}

// Upstream prop feeds often put the side in `name` and the player in `description`.
fn split_player_and_side(outcome: &OddsOutcome) -> (&str, &str) {
    let name = outcome.name.trim();
    let description = outcome.description.as_deref().unwrap_or_default().trim();
    if is_side_label(name) {
        // A bare side label with no description has no player.
        (description, name)
    } else {
        (name, description)
    }
}

fn is_side_label(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "over" | "under" | "more" | "less"
    )
}

fn american_price(price: Option<f64>) -> Result<i32> {
    let Some(price) = price else {
        return Err(EvError::MissingField("price"));
    };
    let reason = if !price.is_finite() {
        "not a finite number"
    } else if price.fract() != 0.0 {
        "american odds must be whole numbers"
    } else if price == 0.0 {
        "american odds of 0 are undefined"
    } else if price.abs() > f64::from(i32::MAX) {
        "out of range"
    } else {
        return Ok(price as i32);
    };
    Err(EvError::InvalidOdds {
        value: price,
        reason,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, price: f64, point: Option<f64>, description: Option<&str>) -> OddsOutcome {
        OddsOutcome {
            name: name.to_string(),
            price: Some(price),
            point,
            description: description.map(str::to_string),
        }
    }

    fn ctx() -> GameContext {
        GameContext {
            sport_key: "basketball_nba".to_string(),
            event_name: "Warriors @ Lakers".to_string(),
            event_date: Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap(),
        }
    }

    #[test]
    fn market_type_strips_prefix_and_alternate_suffix() {
        assert_eq!(market_type_from_key("player_points_alternate"), "points");
        assert_eq!(market_type_from_key("player_rebounds"), "rebounds");
        assert_eq!(market_type_from_key("totals"), "totals");
    }

    #[test]
    fn over_under_inference() {
        assert_eq!(infer_over_under("LeBron James Under 7.5 Assists"), OverUnder::Under);
        assert_eq!(infer_over_under("fewer or LESS"), OverUnder::Under);
        assert_eq!(infer_over_under("More than 20"), OverUnder::Over);
        assert_eq!(infer_over_under(""), OverUnder::Over);
        assert_eq!(infer_over_under("Over or Under"), OverUnder::Under);
    }

    #[test]
    fn sport_names_fall_back_to_uppercase_key() {
        assert_eq!(sport_display_name("basketball_nba"), "NBA");
        assert_eq!(sport_display_name("icehockey_nhl"), "NHL");
        assert_eq!(sport_display_name("soccer_epl"), "SOCCER_EPL");
    }

    #[test]
    fn incomplete_outcomes_are_dropped_silently() {
        let market = OddsMarket {
            key: "player_points".to_string(),
            outcomes: vec![
                outcome("", -110.0, Some(20.5), None),
                outcome("Anthony Davis", -110.0, None, None),
                outcome("LeBron James", -115.0, Some(25.5), Some("Over 25.5")),
            ],
        };
        let lines = normalize_market(Platform::PrizePicks, &ctx(), &market);
        assert_eq!(lines.len(), 1);
        let line = lines[0].as_ref().unwrap();
        assert_eq!(line.player_name(), "LeBron James");
        assert_eq!(line.sport(), "NBA");
        assert_eq!(line.league(), "NBA");
        assert_eq!(line.odds(), -115);
        assert_eq!(line.sportsbook(), "PrizePicks");
    }

    #[test]
    fn side_label_in_name_moves_player_to_description() {
        let market = OddsMarket {
            key: "player_assists".to_string(),
            outcomes: vec![outcome("Under", 105.0, Some(7.5), Some("LeBron James"))],
        };
        let lines = normalize_market(Platform::Underdog, &ctx(), &market);
        let line = lines[0].as_ref().unwrap();
        assert_eq!(line.player_name(), "LeBron James");
        assert_eq!(line.over_under(), OverUnder::Under);
        assert_eq!(line.market_type(), "assists");
    }

    #[test]
    fn bad_prices_are_rejected_not_coerced() {
        let market = OddsMarket {
            key: "player_points".to_string(),
            outcomes: vec![
                outcome("A", 0.0, Some(1.5), None),
                outcome("B", -110.5, Some(1.5), None),
                outcome("C", f64::NAN, Some(1.5), None),
            ],
        };
        let lines = normalize_market(Platform::PrizePicks, &ctx(), &market);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|r| matches!(r, Err(EvError::InvalidOdds { .. }))));
    }

    #[test]
    fn timestamps_accept_rfc3339_and_naive_forms() {
        let a = parse_timestamp("2024-01-16T03:10:00Z").unwrap();
        let b = parse_timestamp("2024-01-16T03:10:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("tonight").is_none());
    }
}
