use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ev::{DEFAULT_MIN_EV_THRESHOLD, DEFAULT_STAKE};
use crate::line::Platform;

pub const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";
pub const DEFAULT_SPORTS: &str = "basketball_nba,americanfootball_nfl,baseball_mlb";
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/lines_cache.json";

const DEFAULT_MAX_MARKET_REQUESTS: usize = 20;
const DEFAULT_FETCH_PARALLELISM: usize = 6;

#[derive(Debug, Clone)]
pub struct Config {
    pub odds_api_key: Option<String>,
    pub odds_api_base_url: String,
    /// Regions queried for regulated-book prices (ODDS_MARKET_REGIONS).
    pub market_regions: String,
    pub sports: Vec<String>,
    pub platforms: Vec<Platform>,
    pub stake: f64,
    pub min_ev_threshold: f64,
    /// Cap on regulated-book lookups per run (MAX_MARKET_REQUESTS).
    pub max_market_requests: usize,
    pub fetch_parallelism: usize,
    pub snapshot_path: PathBuf,
    pub demo_mode: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let odds_api_key = env::var("ODDS_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let odds_api_base_url = env::var("ODDS_API_BASE_URL")
            .unwrap_or_else(|_| ODDS_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let market_regions = env::var("ODDS_MARKET_REGIONS")
            .unwrap_or_else(|_| "us".to_string())
            .trim()
            .to_ascii_lowercase();
        let sports = split_list(&env::var("SCRAPE_SPORTS").unwrap_or_else(|_| DEFAULT_SPORTS.to_string()));
        let platforms = parse_platforms(
            &env::var("SCRAPE_PLATFORMS").unwrap_or_else(|_| "prizepicks,underdog,fliff".to_string()),
        )?;

        Ok(Self {
            odds_api_key,
            odds_api_base_url,
            market_regions,
            sports,
            platforms,
            stake: env_f64("EV_STAKE", DEFAULT_STAKE),
            min_ev_threshold: env_f64("EV_MIN_THRESHOLD", DEFAULT_MIN_EV_THRESHOLD),
            max_market_requests: env::var("MAX_MARKET_REQUESTS")
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_MARKET_REQUESTS),
            fetch_parallelism: env::var("FETCH_PARALLELISM")
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(DEFAULT_FETCH_PARALLELISM)
                .clamp(2, 32),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
            demo_mode: env_bool("DEMO_MODE", false),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.odds_api_key
            .as_deref()
            .context("ODDS_API_KEY missing (set it in the environment or .env, or run with --demo)")
    }
}

pub fn parse_platforms(raw: &str) -> Result<Vec<Platform>> {
    split_list(raw)
        .iter()
        .map(|p| p.parse::<Platform>().with_context(|| format!("SCRAPE_PLATFORMS entry {p:?}")))
        .collect()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
