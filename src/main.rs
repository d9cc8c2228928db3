use clap::{Parser, Subcommand};
use onchain_rank::{
    chains::ExplorerClient,
    config::Settings,
    models::{RankingCache, RankingResult, RawActivity, StoredScore, WalletReport},
    scoring::{BadgeEvaluator, RankingEngine, RankingService},
    store::{ScoreStore, SqliteScoreStore},
    utils,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "onchain-rank")]
#[clap(about = "Rank wallets by their on-chain activity", long_about = None)]
struct Cli {
    /// Settings file (defaults to config/default and config/local)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a wallet's activity from the explorer and rank it
    Rank {
        /// Wallet address or ENS name
        #[clap(short, long)]
        address: String,

        /// Write the score to the database
        #[clap(long)]
        persist: bool,
    },

    /// Rank activity lists stored as JSON files
    File {
        /// Transaction list (array or explorer response)
        #[clap(long)]
        transactions: Option<PathBuf>,

        /// Token transfer list
        #[clap(long)]
        tokens: Option<PathBuf>,

        /// NFT transfer list
        #[clap(long)]
        nfts: Option<PathBuf>,
    },

    /// Re-rank a wallet at a fixed interval
    Watch {
        /// Wallet address or ENS name
        #[clap(short, long)]
        address: String,

        /// Seconds between refreshes (defaults to the configured interval)
        #[clap(short, long)]
        interval: Option<u64>,
    },

    /// Show the highest stored scores
    Leaderboard {
        #[clap(short, long, default_value = "10")]
        limit: usize,
    },

    /// List every badge and its unlock threshold
    Badges,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new().unwrap_or_else(|e| {
            eprintln!("Using default settings: {}", e);
            Settings::default()
        }),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Rank { address, persist } => {
            let address = resolve(&settings, &address).await?;
            let service = build_service(&settings, persist || settings.database.persist_scores).await?;

            let report = service.rank_wallet(&address).await?;
            print_report(&report, cli.json)?;
        }

        Commands::File { transactions, tokens, nfts } => {
            let raw = RawActivity::new(
                read_json(transactions.as_deref())?,
                read_json(tokens.as_deref())?,
                read_json(nfts.as_deref())?,
            );
            let engine = RankingEngine::new(settings.scoring.clone())?;
            let ranking = engine.calculate_raw(&raw);

            if cli.json {
                let badges = BadgeEvaluator::default().evaluate(&ranking);
                let out = serde_json::json!({ "ranking": ranking, "badges": badges });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_ranking(&ranking);
                print_badges(&ranking);
            }
        }

        Commands::Watch { address, interval } => {
            let address = resolve(&settings, &address).await?;
            let service = build_service(&settings, settings.database.persist_scores).await?;
            let seconds = interval.unwrap_or(settings.polling.interval_seconds).max(1);

            info!("Watching {} every {}s", address, seconds);
            let mut ticker = tokio::time::interval(Duration::from_secs(seconds));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for (_, result) in service.refresh_all(std::slice::from_ref(&address)).await {
                            match result {
                                Ok(report) => print_report(&report, cli.json)?,
                                Err(e) => error!("Refresh failed: {}", e),
                            }
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Stopping watch");
                        break;
                    }
                }
            }
        }

        Commands::Leaderboard { limit } => {
            let store = SqliteScoreStore::connect(&settings.database).await?;
            let scores = store.leaderboard(limit).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&scores)?);
            } else {
                print_leaderboard(&scores);
            }
        }

        Commands::Badges => {
            let table = BadgeEvaluator::default().table();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(table)?);
            } else {
                for badge in table {
                    println!(
                        "{:<20} L{} {:<22} {:>6} {}",
                        badge.id,
                        badge.level,
                        badge.title,
                        badge.threshold,
                        badge.family.as_str()
                    );
                }
            }
        }
    }

    Ok(())
}

async fn resolve(settings: &Settings, input: &str) -> anyhow::Result<String> {
    Ok(utils::resolve_wallet(input, settings.explorer.ens_rpc_url.as_deref()).await?)
}

async fn build_service(settings: &Settings, persist: bool) -> anyhow::Result<RankingService> {
    let source = Arc::new(ExplorerClient::new(settings.explorer.clone())?);
    let engine = RankingEngine::new(settings.scoring.clone())?;
    let cache = RankingCache::new(
        Duration::from_secs(settings.cache.ttl_seconds),
        settings.cache.max_entries,
    );

    let mut service = RankingService::new(source, engine, cache);
    if persist {
        let store = SqliteScoreStore::connect(&settings.database).await?;
        service = service.with_store(Arc::new(store));
    }
    Ok(service)
}

fn read_json(path: Option<&Path>) -> anyhow::Result<Value> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(Value::Null),
    }
}

fn print_report(report: &WalletReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n=== Onchain Rank ===");
    println!("Wallet: {}", report.address);
    println!("Calculated at: {}", report.calculated_at);
    print_ranking(&report.ranking);
    print_badges(&report.ranking);
    Ok(())
}

fn print_ranking(ranking: &RankingResult) {
    println!("Total Points: {:.2}", ranking.total_points);
    match ranking.points_to_next_rank() {
        Some(missing) => println!(
            "Rank: {} ({:.2}% to next, {:.2} points missing)",
            ranking.rank, ranking.percentile, missing
        ),
        None => println!("Rank: {} (top tier)", ranking.rank),
    }

    println!("\nBreakdown:");
    println!("  Transactions:     {:.2}", ranking.breakdown.transaction_points);
    println!("  Tokens:           {:.2}", ranking.breakdown.token_points);
    println!("  NFTs:             {:.2}", ranking.breakdown.nft_points);
    println!("  Unique contracts: {:.2}", ranking.breakdown.unique_contract_points);

    println!("\nActivity:");
    println!("  Transactions: {}", ranking.stats.transactions);
    println!("  Tokens:       {}", ranking.stats.tokens);
    println!("  NFTs:         {}", ranking.stats.nfts);
    println!("  Contracts:    {}", ranking.stats.contracts);
}

fn print_badges(ranking: &RankingResult) {
    let evaluator = BadgeEvaluator::default();
    let earned = evaluator.evaluate(ranking);

    println!("\nBadges ({}/{}):", earned.len(), evaluator.table().len());
    for badge in &earned {
        println!("  [L{}] {} - {}", badge.level, badge.title, badge.description);
    }

    for family in onchain_rank::BadgeFamily::ALL {
        if let Some((badge, remaining)) = evaluator.next(family, ranking) {
            println!("  next {}: {} ({} to go)", family.as_str(), badge.title, remaining);
        }
    }
}

fn print_leaderboard(scores: &[StoredScore]) {
    if scores.is_empty() {
        println!("No scores stored yet");
        return;
    }

    for (position, score) in scores.iter().enumerate() {
        println!(
            "{:>3}. {} {:>12.2} {}",
            position + 1,
            score.address,
            score.total_points,
            score.rank
        );
    }
}
