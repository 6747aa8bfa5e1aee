mod latency;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{FeatureStore, MovieId, UserId};
use rand::seq::IndexedRandom;
use server::{
    DEFAULT_K, DEFAULT_POSTER_BASE, DEFAULT_SEARCH_LIMIT, RankRequest, RankResponse,
    RankingOrchestrator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::debug;

use latency::LatencySummary;

/// ReelRank - movie ranking over precomputed features
#[derive(Parser)]
#[command(name = "reel-rank")]
#[command(about = "Rank, search and benchmark movie recommendations from feature tables", long_about = None)]
struct Cli {
    /// Directory holding movie_features.csv and user_features.csv
    #[arg(short, long, default_value = "service/data")]
    data_dir: PathBuf,

    /// Base URL poster paths are appended to
    #[arg(long, default_value = DEFAULT_POSTER_BASE)]
    poster_base: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Personalised recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: UserId,

        /// Number of results to return
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,

        /// Show reason tags for each result
        #[arg(long)]
        explain: bool,
    },

    /// Movies similar to a seed movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        /// Number of results to return
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,

        /// Show reason tags for each result
        #[arg(long)]
        explain: bool,
    },

    /// Search movies by title
    Search {
        #[arg(long)]
        query: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Show every stored feature of one movie
    Movie {
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Measure user-anchored ranking latency over random known users
    Benchmark {
        /// Number of ranking requests
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Results per request
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,

        /// Requests in flight at once
        #[arg(long, default_value = "1")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading feature tables from {}...", cli.data_dir.display());
    let start = Instant::now();
    let store = FeatureStore::load_from_dir(&cli.data_dir)
        .with_context(|| format!("Failed to load features from {}", cli.data_dir.display()))?;
    let (movies, users) = store.counts();
    println!(
        "{} Loaded {} movies / {} users in {:?}",
        "✓".green(),
        movies,
        users,
        start.elapsed()
    );

    let orchestrator =
        Arc::new(RankingOrchestrator::new(Arc::new(store)).with_poster_base(cli.poster_base));

    match cli.command {
        Commands::Recommend { user_id, k, explain } => {
            handle_rank(&orchestrator, RankRequest::for_user(user_id, k), explain)?
        }
        Commands::Similar { movie_id, k, explain } => {
            handle_rank(&orchestrator, RankRequest::for_movie(movie_id, k), explain)?
        }
        Commands::Search { query, limit } => handle_search(&orchestrator, &query, limit),
        Commands::Movie { movie_id } => handle_movie(&orchestrator, movie_id)?,
        Commands::Benchmark {
            requests,
            k,
            concurrent,
        } => handle_benchmark(orchestrator, requests, k, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' and 'similar' commands
fn handle_rank(orchestrator: &RankingOrchestrator, request: RankRequest, explain: bool) -> Result<()> {
    let response = orchestrator.rank(&request)?;
    print_ranking(orchestrator, &response, explain);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(orchestrator: &RankingOrchestrator, query: &str, limit: usize) {
    let hits = orchestrator.search(query, limit);

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if hits.is_empty() {
        println!("  {}", "no matches".dimmed());
    }
    for hit in hits {
        println!("{:>7}  {}", hit.movie_id.to_string().green(), hit.title);
    }
}

/// Handle the 'movie' command
fn handle_movie(orchestrator: &RankingOrchestrator, movie_id: MovieId) -> Result<()> {
    let movie = orchestrator.movie(movie_id)?;

    println!("{}", format!("{} (id {})", movie.title, movie.id).bold().blue());
    println!("{}Genres: {}", "• ".green(), movie.genres);
    if !movie.tmdb_genres.trim().is_empty() {
        println!("{}TMDB genres: {}", "• ".green(), movie.tmdb_genres);
    }
    println!(
        "{}MovieLens: {:.2} mean over {} ratings",
        "• ".cyan(),
        movie.rating_mean,
        movie.rating_count
    );
    println!(
        "{}TMDB: vote {:.1}, popularity {:.1}",
        "• ".cyan(),
        movie.tmdb_vote_avg,
        movie.tmdb_popularity
    );
    if !movie.tmdb_release_date.is_empty() {
        println!("{}Released: {}", "• ".cyan(), movie.tmdb_release_date);
    }
    if movie.has_poster() {
        println!("{}Poster: {}", "• ".cyan(), movie.tmdb_poster_path);
    }
    if !movie.tmdb_overview.is_empty() {
        println!("\n{}", movie.tmdb_overview);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: Arc<RankingOrchestrator>,
    requests: usize,
    k: usize,
    concurrent: usize,
) -> Result<()> {
    let user_ids = orchestrator.store().user_ids();
    if user_ids.is_empty() {
        return Err(anyhow!("No user ids found"));
    }

    // Pick the ids up front so sampling is not part of the measured time
    let mut rng = rand::rng();
    let sampled: Vec<UserId> = (0..requests)
        .filter_map(|_| user_ids.choose(&mut rng).copied())
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(sampled.len());
    for user_id in sampled {
        let permit = permits.clone().acquire_owned().await?;
        let orchestrator = orchestrator.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let result = orchestrator.rank(&RankRequest::for_user(user_id, k));
            drop(permit);
            result.map(|_| start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total = wall_clock.elapsed();
    debug!("Benchmark finished {} requests in {:?}", timings.len(), total);

    let summary = LatencySummary::from_timings(&timings)
        .ok_or_else(|| anyhow!("No requests were made"))?;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} (k={}, concurrent={})", timings.len(), k, concurrent.max(1));
    println!("p50_ms: {:.2}", summary.p50);
    println!("p95_ms: {:.2}", summary.p95);
    println!("p99_ms: {:.2}", summary.p99);
    println!("mean_ms: {:.2}", summary.mean);
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / total.as_secs_f64()
    );

    Ok(())
}

/// Print a ranking response as a numbered list
fn print_ranking(orchestrator: &RankingOrchestrator, response: &RankResponse, explain: bool) {
    let header = match (response.user_id, response.movie_id) {
        (Some(user_id), _) => format!("Recommendations for user {}:", user_id),
        (_, Some(movie_id)) => {
            let title = orchestrator
                .movie(movie_id)
                .map(|m| m.title.as_str())
                .unwrap_or("unknown");
            format!("Movies similar to {}:", title)
        }
        _ => "Results:".to_string(),
    };
    println!("{}", header.bold().blue());

    for (i, result) in response.results.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.3}",
            (i + 1).to_string().green(),
            result.title,
            result.score
        );
        if explain {
            let reasons: Vec<&str> = result.reasons.iter().map(|r| r.as_str()).collect();
            let reasons = if reasons.is_empty() {
                "-".to_string()
            } else {
                reasons.join(", ")
            };
            println!("   Reasons: {}", reasons.dimmed());
            if !result.poster_url.is_empty() {
                println!("   Poster: {}", result.poster_url);
            }
        }
    }
    println!("{}", format!("({} ms)", response.latency_ms).dimmed());
}
