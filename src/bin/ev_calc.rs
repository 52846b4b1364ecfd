use clap::Parser;

use prop_ev::ev::{EvParams, calculate_ev};
use prop_ev::odds::OddsFormat;

/// One-off EV check for a single price against a fair price.
#[derive(Debug, Parser)]
#[command(name = "ev_calc", version)]
struct Args {
    /// Price offered by the platform.
    #[arg(allow_hyphen_values = true)]
    sportsbook_odds: f64,

    /// Fair market price.
    #[arg(allow_hyphen_values = true)]
    market_odds: f64,

    #[arg(long, default_value_t = 100.0)]
    stake: f64,

    /// Treat both prices as decimal odds.
    #[arg(long)]
    decimal: bool,

    #[arg(long, default_value_t = 0.0)]
    min_ev: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let params = EvParams {
        stake: args.stake,
        format: if args.decimal {
            OddsFormat::Decimal
        } else {
            OddsFormat::American
        },
        min_ev_threshold: args.min_ev,
    };

    // No network or cache access: just the engine on two numbers.
    let r = calculate_ev(args.sportsbook_odds, args.market_odds, &params)?;

    println!("Book decimal:   {:.3}", r.sportsbook_decimal_odds);
    println!("Market decimal: {:.3}", r.market_decimal_odds);
    println!("Win prob:       {:.2}%", r.win_probability * 100.0);
    println!("Breakeven:      {:.2}%", r.breakeven_probability * 100.0);
    println!("Payout:         ${:.2}", r.payout_if_win);
    println!("EV:             ${:.2} ({:+.2}%)", r.ev_dollars, r.ev_percentage);
    println!("Positive EV:    {}", r.is_positive_ev);

    Ok(())
}
