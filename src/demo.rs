use chrono::{Duration, Utc};
use rand::Rng;

use crate::error::Result;
use crate::ev::{EvParams, LineEv, calculate_line_ev_with};
use crate::line::{Line, LineFields, Platform};

/// A sample line plus the regulated-book quotes it is priced against. Lines
/// without quotes get a mock market price.
#[derive(Debug, Clone)]
pub struct DemoLine {
    pub line: Line,
    pub book_quotes: Vec<(&'static str, i32)>,
}

pub fn sample_slate() -> Result<Vec<DemoLine>> {
    let tip_off = Utc::now() + Duration::hours(6);
    let rows: [(Platform, &str, &str, f64, i32, &[(&'static str, i32)]); 5] = [
        (
            Platform::PrizePicks,
            "Jayson Tatum",
            "points",
            28.5,
            -110,
            &[("FanDuel", -125), ("DraftKings", -120)],
        ),
        (
            Platform::Underdog,
            "Tyrese Haliburton",
            "assists",
            9.5,
            105,
            &[("FanDuel", 100), ("BetMGM", 110)],
        ),
        (
            Platform::PrizePicks,
            "Myles Turner",
            "rebounds",
            7.5,
            -105,
            &[("FanDuel", -130), ("DraftKings", -125)],
        ),
        (Platform::Fliff, "Jaylen Brown", "points", 23.5, -115, &[]),
        (Platform::Underdog, "Pascal Siakam", "rebounds", 6.5, 100, &[]),
    ];

    rows.into_iter()
        .map(|(platform, player, market_type, line_value, odds, quotes)| -> Result<DemoLine> {
            let line = Line::new(LineFields {
                sportsbook: platform.display_name().to_string(),
                sport: "NBA".to_string(),
                league: "NBA".to_string(),
                event_name: "Celtics @ Pacers".to_string(),
                player_name: player.to_string(),
                market_type: market_type.to_string(),
                line_value,
                odds,
                over_under: "over".to_string(),
                event_date: tip_off,
                scraped_at: None,
            })?;
            Ok(DemoLine {
                line,
                book_quotes: quotes.to_vec(),
            })
        })
        .collect()
}

/// A plausible American price for `market_type`, never inside (-100, 100).
pub fn mock_market_odds<R: Rng + ?Sized>(market_type: &str, rng: &mut R) -> i32 {
    let (low, high) = match market_type.to_ascii_lowercase().as_str() {
        "points" => (-120, 100),
        "rebounds" => (-115, 105),
        "assists" => (-110, 110),
        "touchdowns" => (-180, 150),
        _ => (-110, 110),
    };
    loop {
        let odds = rng.gen_range(low..=high);
        if odds <= -100 || odds >= 100 {
            return odds;
        }
    }
}

/// Prices the sample slate through the real EV engine. Quoted lines use the
/// mean of their quotes; the rest use [`mock_market_odds`].
pub fn demo_opportunities<R: Rng + ?Sized>(params: &EvParams, rng: &mut R) -> Result<Vec<LineEv>> {
    sample_slate()?
        .into_iter()
        .map(|demo| {
            let market_odds = if demo.book_quotes.is_empty() {
                f64::from(mock_market_odds(demo.line.market_type(), &mut *rng))
            } else {
                let sum: f64 = demo.book_quotes.iter().map(|(_, odds)| f64::from(*odds)).sum();
                sum / demo.book_quotes.len() as f64
            };
            calculate_line_ev_with(&demo.line, market_odds, params)
        })
        .collect()
}
