use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use prop_ev::normalize::{GameContext, normalize_events, normalize_market};
use prop_ev::payload::{OddsMarket, OddsOutcome, parse_odds_events_json};
use prop_ev::{EvError, OverUnder, Platform};

fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn lakers_game() -> GameContext {
    GameContext {
        sport_key: "basketball_nba".to_string(),
        event_name: "Golden State Warriors @ Los Angeles Lakers".to_string(),
        event_date: Utc.with_ymd_and_hms(2024, 1, 16, 3, 10, 0).unwrap(),
    }
}

fn outcome(name: &str, price: f64, point: f64, description: &str) -> OddsOutcome {
    OddsOutcome {
        name: name.to_string(),
        price: Some(price),
        point: Some(point),
        description: Some(description.to_string()),
    }
}

#[test]
fn prizepicks_payload_normalizes_player_markets_only() {
    let raw = read_fixture("dfs_nba_prizepicks.json");
    let events = parse_odds_events_json(&raw).expect("fixture should parse");
    assert_eq!(events.len(), 2);

    let out = normalize_events(Platform::PrizePicks, "basketball_nba", &events);

    let ids: Vec<&str> = out.lines.iter().map(|l| l.unique_id()).collect();
    assert_eq!(
        ids,
        vec![
            "prizepicks_nba_lebron_james_points_25.5_over",
            "prizepicks_nba_stephen_curry_points_28.5_over",
            "prizepicks_nba_lebron_james_assists_7.5_under",
        ]
    );

    let first = &out.lines[0];
    assert_eq!(first.sportsbook(), "PrizePicks");
    assert_eq!(first.sport(), "NBA");
    assert_eq!(first.event_name(), "Golden State Warriors @ Los Angeles Lakers");
    assert_eq!(first.odds(), -110);
    assert_eq!(
        first.event_date(),
        Utc.with_ymd_and_hms(2024, 1, 16, 3, 10, 0).unwrap()
    );

    // The second game has an unparseable start time.
    assert_eq!(out.rejected.len(), 1);
    assert!(matches!(&out.rejected[0], EvError::InvalidEventDate(raw) if raw == "tbd"));
}

#[test]
fn other_bookmakers_in_the_payload_are_ignored() {
    let raw = read_fixture("dfs_nba_prizepicks.json");
    let events = parse_odds_events_json(&raw).expect("fixture should parse");

    let out = normalize_events(Platform::Underdog, "basketball_nba", &events);
    assert_eq!(out.lines.len(), 1);
    assert_eq!(out.lines[0].sportsbook(), "Underdog");
    assert_eq!(out.lines[0].odds(), -115);
    assert!(out.rejected.is_empty());

    let out = normalize_events(Platform::Fliff, "basketball_nba", &events);
    assert!(out.lines.is_empty());
    assert!(out.rejected.is_empty());
}

#[test]
fn alternate_market_with_under_description() {
    let market = OddsMarket {
        key: "player_assists_alternate".to_string(),
        outcomes: vec![outcome(
            "LeBron James",
            -110.0,
            7.5,
            "LeBron James Under 7.5 Assists",
        )],
    };

    let lines = normalize_market(Platform::PrizePicks, &lakers_game(), &market);
    assert_eq!(lines.len(), 1);
    let line = lines[0].as_ref().expect("line should validate");
    assert_eq!(line.market_type(), "assists");
    assert_eq!(line.over_under(), OverUnder::Under);
    assert_eq!(line.line_value(), 7.5);
    assert_eq!(line.player_name(), "LeBron James");
}

#[test]
fn player_in_description_with_side_in_name() {
    let market = OddsMarket {
        key: "player_rebounds".to_string(),
        outcomes: vec![
            outcome("Under", 105.0, 11.5, "Anthony Davis"),
            outcome("Over", -125.0, 11.5, "Anthony Davis"),
        ],
    };

    let lines: Vec<_> = normalize_market(Platform::Underdog, &lakers_game(), &market)
        .into_iter()
        .map(|r| r.expect("line should validate"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].player_name(), "Anthony Davis");
    assert_eq!(lines[0].over_under(), OverUnder::Under);
    assert_eq!(lines[1].over_under(), OverUnder::Over);
    assert_ne!(lines[0].unique_id(), lines[1].unique_id());
}

#[test]
fn bad_prices_are_rejected_not_rounded() {
    let market = OddsMarket {
        key: "player_points".to_string(),
        outcomes: vec![
            outcome("Stephen Curry", 0.0, 28.5, "Over"),
            outcome("Stephen Curry", -112.5, 28.5, "Over"),
            outcome("Klay Thompson", 120.0, 18.5, "Over"),
        ],
    };

    let results = normalize_market(Platform::Fliff, &lakers_game(), &market);
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(EvError::InvalidOdds { .. })));
    assert!(matches!(results[1], Err(EvError::InvalidOdds { .. })));
    let klay = results[2].as_ref().expect("line should validate");
    assert_eq!(klay.odds(), 120);
    assert_eq!(klay.sportsbook(), "Fliff");
}

#[test]
fn unpriced_outcome_rejects_only_itself() {
    let raw = r#"[{"commence_time":"2024-01-16T03:10:00Z","home_team":"Los Angeles Lakers",
        "away_team":"Golden State Warriors","bookmakers":[
        {"key":"prizepicks","markets":[{"key":"player_points","outcomes":[
            {"name":"LeBron James","price":-110,"point":25.5,"description":"Over"},
            {"name":"Stephen Curry","point":28.5,"description":"Over"}
        ]}]}
    ]}]"#;
    let events = parse_odds_events_json(raw).expect("payload should parse");

    let out = normalize_events(Platform::PrizePicks, "basketball_nba", &events);
    assert_eq!(out.lines.len(), 1);
    assert_eq!(out.lines[0].player_name(), "LeBron James");
    assert_eq!(out.rejected, vec![EvError::MissingField("price")]);
}

#[test]
fn bare_side_label_without_player_is_dropped() {
    let market = OddsMarket {
        key: "player_points".to_string(),
        outcomes: vec![
            outcome("Under", -110.0, 20.5, ""),
            outcome("Over", -110.0, 20.5, "Anthony Davis"),
        ],
    };

    let results = normalize_market(Platform::PrizePicks, &lakers_game(), &market);
    assert_eq!(results.len(), 1);
    let line = results[0].as_ref().expect("line should validate");
    assert_eq!(line.player_name(), "Anthony Davis");
    assert_eq!(line.over_under(), OverUnder::Over);
}
