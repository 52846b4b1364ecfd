use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use prop_ev::config::{Config, parse_platforms, split_list};
use prop_ev::ev::LineEv;
use prop_ev::odds_fetch::OddsApiClient;
use prop_ev::pipeline::{self, PipelineSettings, sort_by_ev_desc};
use prop_ev::snapshot::{Snapshot, save_snapshot};
use prop_ev::{demo, report};

/// Scrape DFS player props, price them against regulated books and cache the
/// positive-EV ones.
#[derive(Debug, Parser)]
#[command(name = "prop_ev", version)]
struct Cli {
    /// Use the built-in sample slate instead of live data.
    #[arg(long)]
    demo: bool,

    /// Seed for demo-mode mock prices.
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated sport keys (overrides SCRAPE_SPORTS).
    #[arg(long)]
    sports: Option<String>,

    /// Comma-separated platforms (overrides SCRAPE_PLATFORMS).
    #[arg(long)]
    platforms: Option<String>,

    #[arg(long)]
    stake: Option<f64>,

    /// Minimum EV percent for a line to count as positive.
    #[arg(long)]
    min_ev: Option<f64>,

    #[arg(long)]
    max_market_requests: Option<usize>,

    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// List the provider's sports and exit.
    #[arg(long)]
    list_sports: bool,
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    let cfg = match Config::from_env().and_then(|cfg| apply_cli(cfg, &cli)) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Config error: {err:#}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(err) = run(&cli, &cfg) {
        error!("run failed: {err:#}");
        std::process::exit(1);
    }
}

fn apply_cli(mut cfg: Config, cli: &Cli) -> Result<Config> {
    if cli.demo {
        cfg.demo_mode = true;
    }
    if let Some(sports) = cli.sports.as_deref() {
        cfg.sports = split_list(sports);
    }
    if let Some(platforms) = cli.platforms.as_deref() {
        cfg.platforms = parse_platforms(platforms)?;
    }
    if let Some(stake) = cli.stake {
        cfg.stake = stake;
    }
    if let Some(min_ev) = cli.min_ev {
        cfg.min_ev_threshold = min_ev;
    }
    if let Some(max) = cli.max_market_requests {
        cfg.max_market_requests = max;
    }
    if let Some(path) = cli.snapshot.clone() {
        cfg.snapshot_path = path;
    }
    Ok(cfg)
}

fn run(cli: &Cli, cfg: &Config) -> Result<()> {
    let started = Instant::now();

    if cli.list_sports {
        let client = OddsApiClient::from_config(cfg)?;
        for sport in client.sports()? {
            println!(
                "{:<36} {:<20} {}{}",
                sport.key,
                sport.group,
                sport.title,
                if sport.active { "" } else { " (inactive)" }
            );
        }
        return Ok(());
    }

    let settings = PipelineSettings::from_config(cfg);
    let opportunities = if cfg.demo_mode {
        warn!("demo mode: using the sample slate, not live prices");
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut opps: Vec<LineEv> = demo::demo_opportunities(&settings.params, &mut rng)?
            .into_iter()
            .filter(LineEv::is_positive_ev)
            .collect();
        sort_by_ev_desc(&mut opps);
        opps
    } else {
        let client = OddsApiClient::from_config(cfg)?;
        info!(
            sports = %cfg.sports.join(","),
            platforms = cfg.platforms.len(),
            "starting scrape"
        );
        let output = pipeline::run(&client, &settings)
            .context("pipeline failed; previous snapshot left in place")?;
        let s = &output.stats;
        info!(
            lines = s.lines_scraped,
            rejected = s.lines_rejected,
            duplicates = s.duplicates,
            unsupported = s.unsupported_market,
            unmatched = s.unmatched,
            over_budget = s.over_budget,
            dfs_failures = s.dfs_failures,
            market_failures = s.market_failures,
            ev_errors = s.ev_errors,
            "run stats"
        );
        output.opportunities
    };

    let snapshot = Snapshot::new(opportunities);
    save_snapshot(&cfg.snapshot_path, &snapshot)?;
    info!(
        count = snapshot.total_count,
        path = %cfg.snapshot_path.display(),
        "snapshot saved"
    );

    let summary = report::summarize(&snapshot.opportunities, 3);
    println!("{}", summary.render(cfg.stake));
    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "run complete"
    );
    Ok(())
}
