use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use engine::{
    paginate, rank_feed, related, trending, CorpusIndex, Page, SortMode, DEFAULT_RELATED_K,
    TRENDING_WINDOW_DAYS,
};
use ranker::{load_corpus, load_profile, related_candidates, resolve_now};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Rank blog posts: related, feed, trending and search", long_about = None)]
struct Cli {
    /// Corpus path (JSON/JSONL file or directory)
    #[arg(long)]
    corpus: PathBuf,
    /// Reference time as RFC3339; defaults to the current time
    #[arg(long)]
    now: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the posts most similar to one post
    Related {
        /// Target post id
        #[arg(long)]
        post: String,
        /// Number of related posts to return
        #[arg(long, default_value_t = DEFAULT_RELATED_K)]
        k: usize,
    },
    /// Score the whole corpus as a personalized feed
    Feed {
        /// Interest profile file (JSON array of {category, score, tags})
        #[arg(long)]
        profile: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List recently created posts by likes
    Trending {
        #[arg(long, default_value_t = TRENDING_WINDOW_DAYS)]
        window_days: i64,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Search the corpus
    Search {
        /// Query string
        #[arg(long)]
        query: String,
        /// Result order: relevance, newest or popular
        #[arg(long, default_value = "relevance")]
        sort: SortMode,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let docs = load_corpus(&cli.corpus)?;
    let now = resolve_now(cli.now.as_deref())?;
    tracing::info!(num_docs = docs.len(), "corpus loaded");

    match cli.command {
        Commands::Related { post, k } => {
            let target = docs
                .iter()
                .find(|doc| doc.id == post)
                .cloned()
                .ok_or_else(|| anyhow!("post `{post}` not found in corpus"))?;
            let candidates = related_candidates(&docs, &target, k);
            let hits = related(&target, &candidates, k);
            print_json(&hits)
        }
        Commands::Feed { profile, page, limit } => {
            let interests = match profile {
                Some(path) => load_profile(&path)?,
                None => Vec::new(),
            };
            let ranked = rank_feed(&docs, &interests, now);
            let result = paginate(ranked, Page::new(page, limit));
            print_json(&result)
        }
        Commands::Trending { window_days, page, limit } => {
            let result = trending(&docs, window_days, now, Page::new(page, limit));
            print_json(&result)
        }
        Commands::Search { query, sort, page, limit } => {
            if query.trim().is_empty() {
                bail!("query must not be empty");
            }
            let index = CorpusIndex::build(docs);
            let result = index.search_page(&query, sort, Page::new(page, limit), now);
            print_json(&result)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
