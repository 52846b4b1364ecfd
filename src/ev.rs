use serde::{Deserialize, Serialize};

use crate::error::{EvError, Result};
use crate::line::Line;
use crate::odds::{OddsFormat, implied_probability, round_to, to_decimal};

pub const DEFAULT_STAKE: f64 = 100.0;
pub const DEFAULT_MIN_EV_THRESHOLD: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvParams {
    pub stake: f64,
    pub format: OddsFormat,
    /// Percent; a result is positive only when strictly above it.
    pub min_ev_threshold: f64,
}

impl Default for EvParams {
    fn default() -> Self {
        Self {
            stake: DEFAULT_STAKE,
            format: OddsFormat::American,
            min_ev_threshold: DEFAULT_MIN_EV_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvResult {
    pub ev_dollars: f64,
    pub ev_percentage: f64,
    pub win_probability: f64,
    pub payout_if_win: f64,
    pub breakeven_probability: f64,
    pub sportsbook_decimal_odds: f64,
    pub market_decimal_odds: f64,
    pub is_positive_ev: bool,
}

/// Expected value of taking `sportsbook_odds` when `market_odds` is the fair
/// price. The market's implied probability is the win probability.
pub fn calculate_ev(sportsbook_odds: f64, market_odds: f64, params: &EvParams) -> Result<EvResult> {
    let stake = params.stake;
    if !stake.is_finite() || stake <= 0.0 {
        return Err(EvError::InvalidStake(stake));
    }

    let sportsbook_decimal = to_decimal(sportsbook_odds, params.format)?;
    let market_decimal = to_decimal(market_odds, params.format)?;

    let win_probability = implied_probability(market_decimal)?;
    let breakeven_probability = implied_probability(sportsbook_decimal)?;

    let payout_if_win = stake * sportsbook_decimal;
    let profit_if_win = payout_if_win - stake;

    let ev_dollars = win_probability * profit_if_win - (1.0 - win_probability) * stake;
    let ev_percentage = round_to(ev_dollars / stake * 100.0, 2);

    Ok(EvResult {
        ev_dollars: round_to(ev_dollars, 2),
        ev_percentage,
        win_probability: round_to(win_probability, 4),
        payout_if_win: round_to(payout_if_win, 2),
        breakeven_probability: round_to(breakeven_probability, 4),
        sportsbook_decimal_odds: round_to(sportsbook_decimal, 3),
        market_decimal_odds: round_to(market_decimal, 3),
        is_positive_ev: ev_percentage > params.min_ev_threshold,
    })
}

pub fn is_positive_ev(
    sportsbook_odds: f64,
    market_odds: f64,
    min_ev_threshold: f64,
    format: OddsFormat,
) -> Result<bool> {
    let params = EvParams {
        format,
        min_ev_threshold,
        ..EvParams::default()
    };
    Ok(calculate_ev(sportsbook_odds, market_odds, &params)?.is_positive_ev)
}

/// A line joined with its matched market price and the resulting EV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEv {
    #[serde(flatten)]
    pub line: Line,
    pub market_odds: f64,
    #[serde(flatten)]
    pub ev: EvResult,
}

impl LineEv {
    pub fn is_positive_ev(&self) -> bool {
        self.ev.is_positive_ev
    }
}

pub fn calculate_line_ev(line: &Line, market_odds: f64) -> Result<LineEv> {
    calculate_line_ev_with(line, market_odds, &EvParams::default())
}

/// Line odds are always American, so `params.format` is ignored here.
pub fn calculate_line_ev_with(line: &Line, market_odds: f64, params: &EvParams) -> Result<LineEv> {
    let params = EvParams {
        format: OddsFormat::American,
        ..*params
    };
    let ev = calculate_ev(f64::from(line.odds()), market_odds, &params)?;
    Ok(LineEv {
        line: line.clone(),
        market_odds,
        ev,
    })
}
