use crate::line::Line;
use crate::payload::{OddsEvent, OddsOutcome};

/// Upstream market key for a normalized market type, if it is one we price.
pub fn player_market_key(market_type: &str) -> Option<&'static str> {
    match market_type.trim().to_ascii_lowercase().as_str() {
        "points" => Some("player_points"),
        "rebounds" => Some("player_rebounds"),
        "assists" => Some("player_assists"),
        "touchdowns" => Some("player_touchdowns"),
        _ => None,
    }
}

/// Player name is a case-insensitive substring of the description and the
/// threshold is exactly equal. No tolerance: 25.5 never matches 25.0 or 26.0.
pub fn outcome_matches(line: &Line, outcome: &OddsOutcome) -> bool {
    let Some(point) = outcome.point else {
        return false;
    };
    if point != line.line_value() {
        return false;
    }
    let description = outcome.description.as_deref().unwrap_or_default().to_lowercase();
    description.contains(&line.player_name().to_lowercase())
}

/// First eligible price in the given order, or `None`.
pub fn find_matching_price<'a, I>(line: &Line, outcomes: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a OddsOutcome>,
{
    outcomes
        .into_iter()
        .filter(|o| outcome_matches(line, o))
        .find_map(|o| o.price)
}

/// Searches games → bookmakers → markets keyed `market_key`, in payload order.
pub fn find_market_price(line: &Line, events: &[OddsEvent], market_key: &str) -> Option<f64> {
    let outcomes = events
        .iter()
        .flat_map(|e| e.markets_with_key(market_key))
        .flat_map(|m| m.outcomes.iter());
    find_matching_price(line, outcomes)
}

/// Unweighted mean of every price in markets keyed `market_key`, regardless of
/// player. Coarser than [`find_market_price`].
pub fn market_consensus(events: &[OddsEvent], market_key: &str) -> Option<f64> {
    let (sum, count) = events
        .iter()
        .flat_map(|e| e.markets_with_key(market_key))
        .flat_map(|m| m.outcomes.iter())
        .filter_map(|o| o.price)
        .fold((0.0, 0usize), |(sum, count), price| (sum + price, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::line::LineFields;

    fn line(player: &str, value: f64) -> Line {
        Line::new(LineFields {
            sportsbook: "PrizePicks".to_string(),
            sport: "NBA".to_string(),
            league: "NBA".to_string(),
            event_name: "Warriors @ Lakers".to_string(),
            player_name: player.to_string(),
            market_type: "points".to_string(),
            line_value: value,
            odds: -110,
            over_under: "over".to_string(),
            event_date: Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap(),
            scraped_at: None,
        })
        .unwrap()
    }

    fn outcome(description: &str, point: f64, price: f64) -> OddsOutcome {
        OddsOutcome {
            name: "Over".to_string(),
            price: Some(price),
            point: Some(point),
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn picks_the_named_player_at_the_same_threshold() {
        let outcomes = vec![
            outcome("Anthony Davis", 25.5, 110.0),
            outcome("LeBron James", 25.5, -120.0),
        ];
        assert_eq!(find_matching_price(&line("LeBron James", 25.5), &outcomes), Some(-120.0));
    }

    #[test]
    fn any_threshold_difference_is_a_miss() {
        let l = line("LeBron James", 25.5);
        for point in [25.0, 26.0, 25.4, 25.51] {
            assert!(!outcome_matches(&l, &outcome("LeBron James", point, -120.0)));
        }
    }

    #[test]
    fn name_match_is_case_insensitive_substring() {
        let l = line("lebron james", 25.5);
        assert!(outcome_matches(&l, &outcome("LEBRON JAMES (LAL)", 25.5, -120.0)));
        assert!(!outcome_matches(&l, &outcome("Bronny James", 25.5, -120.0)));
    }

    #[test]
    fn first_match_wins() {
        let outcomes = vec![
            outcome("LeBron James", 25.5, -105.0),
            outcome("LeBron James", 25.5, -130.0),
        ];
        assert_eq!(find_matching_price(&line("LeBron James", 25.5), &outcomes), Some(-105.0));
    }

    #[test]
    fn missing_point_or_description_never_matches() {
        let l = line("LeBron James", 25.5);
        let mut o = outcome("LeBron James", 25.5, -120.0);
        o.point = None;
        assert!(!outcome_matches(&l, &o));
        let mut o = outcome("LeBron James", 25.5, -120.0);
        o.description = None;
        assert!(!outcome_matches(&l, &o));
        assert_eq!(find_matching_price(&l, &[]), None);
    }

    #[test]
    fn market_keys() {
        assert_eq!(player_market_key("Points"), Some("player_points"));
        assert_eq!(player_market_key("touchdowns"), Some("player_touchdowns"));
        assert_eq!(player_market_key("pra"), None);
    }
}
