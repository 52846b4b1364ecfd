use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EvError;
use crate::ev::{EvParams, LineEv, calculate_line_ev_with};
use crate::line::{Line, Platform};
use crate::matcher::{find_market_price, player_market_key};
use crate::normalize::normalize_events;
use crate::odds::OddsFormat;
use crate::odds_fetch::OddsSource;
use crate::payload::OddsEvent;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sports: Vec<String>,
    pub platforms: Vec<Platform>,
    pub params: EvParams,
    pub max_market_requests: usize,
    pub parallelism: usize,
}

impl PipelineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            sports: cfg.sports.clone(),
            platforms: cfg.platforms.clone(),
            params: EvParams {
                stake: cfg.stake,
                format: OddsFormat::American,
                min_ev_threshold: cfg.min_ev_threshold,
            },
            max_market_requests: cfg.max_market_requests,
            parallelism: cfg.fetch_parallelism,
        }
    }
}

/// Normalized lines for one sport key, as scraped from every platform.
#[derive(Debug, Clone)]
pub struct SportLines {
    pub sport_key: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub dfs_requests: usize,
    pub dfs_failures: usize,
    pub lines_scraped: usize,
    pub lines_rejected: usize,
    pub duplicates: usize,
    pub unsupported_market: usize,
    pub market_requests: usize,
    pub market_failures: usize,
    pub over_budget: usize,
    pub unmatched: usize,
    pub ev_errors: usize,
    pub evaluated: usize,
    pub positive: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub opportunities: Vec<LineEv>,
    pub stats: RunStats,
}

/// Scrape → match → compute. Keeps only positive-EV lines, best first.
/// Fails only when every platform request failed.
pub fn run(source: &dyn OddsSource, settings: &PipelineSettings) -> Result<PipelineOutput> {
    let mut stats = RunStats::default();

    let batches = scrape_lines(source, settings, &mut stats);
    if stats.dfs_requests > 0 && stats.dfs_failures == stats.dfs_requests {
        return Err(anyhow::anyhow!(
            "all {} platform requests failed",
            stats.dfs_requests
        ));
    }

    let evaluated = evaluate_lines(source, &batches, settings, &mut stats);
    let mut opportunities: Vec<LineEv> = evaluated
        .into_iter()
        .filter(LineEv::is_positive_ev)
        .collect();
    sort_by_ev_desc(&mut opportunities);
    stats.positive = opportunities.len();

    info!(
        scraped = stats.lines_scraped,
        evaluated = stats.evaluated,
        positive = stats.positive,
        "pipeline finished"
    );
    Ok(PipelineOutput {
        opportunities,
        stats,
    })
}

pub fn scrape_lines(
    source: &dyn OddsSource,
    settings: &PipelineSettings,
    stats: &mut RunStats,
) -> Vec<SportLines> {
    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for sport_key in &settings.sports {
        let mut lines = Vec::new();
        for &platform in &settings.platforms {
            stats.dfs_requests += 1;
            let events = match source.dfs_events(sport_key, platform) {
                Ok(events) => events,
                Err(err) => {
                    stats.dfs_failures += 1;
                    warn!(%platform, sport = %sport_key, "could not fetch lines: {err:#}");
                    continue;
                }
            };

            let normalized = normalize_events(platform, sport_key, &events);
            for err in &normalized.rejected {
                debug!(%platform, sport = %sport_key, "rejected record: {err}");
            }
            stats.lines_rejected += normalized.rejected.len();
            info!(
                %platform,
                sport = %sport_key,
                lines = normalized.lines.len(),
                rejected = normalized.rejected.len(),
                "scraped"
            );

            for line in normalized.lines {
                if seen.insert(line.unique_id().to_string()) {
                    stats.lines_scraped += 1;
                    lines.push(line);
                } else {
                    stats.duplicates += 1;
                }
            }
        }
        if !lines.is_empty() {
            out.push(SportLines {
                sport_key: sport_key.clone(),
                lines,
            });
        }
    }

    out
}

/// Matches every line against regulated-book prices and computes EV for the
/// matched ones. Market data is fetched once per (sport, market key).
pub fn evaluate_lines(
    source: &dyn OddsSource,
    batches: &[SportLines],
    settings: &PipelineSettings,
    stats: &mut RunStats,
) -> Vec<LineEv> {
    let mut matched: Vec<(Line, f64)> = Vec::new();

    for batch in batches {
        let mut by_market: BTreeMap<&'static str, Vec<&Line>> = BTreeMap::new();
        for line in &batch.lines {
            match player_market_key(line.market_type()) {
                Some(key) => by_market.entry(key).or_default().push(line),
                None => stats.unsupported_market += 1,
            }
        }

        for (market_key, lines) in by_market {
            if stats.market_requests >= settings.max_market_requests {
                stats.over_budget += lines.len();
                continue;
            }
            stats.market_requests += 1;
            let events: Vec<OddsEvent> = match source.market_events(&batch.sport_key, market_key) {
                Ok(events) => events,
                Err(err) => {
                    stats.market_failures += 1;
                    warn!(sport = %batch.sport_key, market = market_key, "could not fetch market odds: {err:#}");
                    continue;
                }
            };

            for line in lines {
                match find_market_price(line, &events, market_key) {
                    Some(price) => matched.push((line.clone(), price)),
                    None => stats.unmatched += 1,
                }
            }
        }
    }

    if stats.over_budget > 0 {
        warn!(
            skipped = stats.over_budget,
            limit = settings.max_market_requests,
            "market request budget exhausted"
        );
    }

    let (evaluated, failures) = evaluate_matched(&matched, &settings.params, settings.parallelism);
    for (id, err) in &failures {
        warn!(line = %id, "ev calculation failed: {err}");
    }
    stats.ev_errors += failures.len();
    stats.evaluated += evaluated.len();
    evaluated
}

/// EV for already-matched pairs, computed in parallel. Failures come back with
/// the line's unique id.
pub fn evaluate_matched(
    matched: &[(Line, f64)],
    params: &EvParams,
    parallelism: usize,
) -> (Vec<LineEv>, Vec<(String, EvError)>) {
    let compute = || {
        matched
            .par_iter()
            .map(|(line, market_odds)| {
                calculate_line_ev_with(line, *market_odds, params)
                    .map_err(|err| (line.unique_id().to_string(), err))
            })
            .collect::<Vec<_>>()
    };
    let results = with_pool(&build_pool(parallelism), compute);

    let mut evaluated = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(ev) => evaluated.push(ev),
            Err(failure) => failures.push(failure),
        }
    }
    (evaluated, failures)
}

pub fn sort_by_ev_desc(lines: &mut [LineEv]) {
    lines.sort_by(|a, b| {
        b.ev.ev_percentage
            .partial_cmp(&a.ev.ev_percentage)
            .unwrap_or(Ordering::Equal)
    });
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 32))
        .build()
        .ok()
}

fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}
