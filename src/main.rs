use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use subresolve::config::ACCOUNTS_ENV_VAR;
use subresolve::{Quality, ResolverConfig, SearchQuery, TrackResolver};

/// Resolve a track on the configured OpenSubsonic servers and print the best match as JSON.
#[derive(Parser, Debug)]
#[command(name = "subresolve")]
#[command(about = "Find the best-matching track across OpenSubsonic accounts")]
struct Args {
    /// Search keyword sent to the server
    keyword: String,

    /// Song name to match against; defaults to the keyword
    name: Option<String>,

    /// Artist name(s) to match against
    artist: Option<String>,

    /// Accounts file (JSON list of credentials)
    #[arg(long, env = ACCOUNTS_ENV_VAR)]
    accounts: Option<PathBuf>,

    /// Stream quality: LOW, HIGH or LOSSLESS
    #[arg(long, value_parser = clap::value_parser!(Quality))]
    quality: Option<Quality>,

    /// Maximum number of candidates, 0 for all
    #[arg(long, default_value = "0")]
    limit: usize,
}

impl Args {
    fn config(&self) -> ResolverConfig {
        match &self.accounts {
            Some(path) => ResolverConfig::default().with_accounts_path(path),
            None => ResolverConfig::default(),
        }
    }

    fn query(&self) -> SearchQuery {
        let name = self.name.clone().unwrap_or_else(|| self.keyword.clone());
        let query = SearchQuery::new(self.keyword.clone())
            .with_song(name, self.artist.clone().unwrap_or_default())
            .with_limit(self.limit);
        match self.quality {
            Some(quality) => query.with_quality(quality),
            None => query,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let resolver = TrackResolver::connect(&args.config()).await;

    match resolver.parse_song(&args.query()).await {
        Some(candidate) => {
            println!("{}", serde_json::to_string_pretty(&candidate)?);
            // Keep the runtime alive until the deferred submission has been sent.
            resolver.notifier().wait_idle().await;
        }
        None => println!("null"),
    }
    Ok(())
}
