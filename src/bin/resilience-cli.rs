use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use resilience_layer::lock::normalize_domain;

#[derive(Parser)]
#[command(name = "resilience-cli")]
#[command(about = "Management CLI for the resilience layer admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "RESILIENCE_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, store state and cache mode
    Status,
    /// Probe the store connection
    Health,
    /// Show cache hit rate and counters
    Cache,
    /// Empty the in-process fallback cache
    CacheClear,
    /// Drop expired entries from the in-process fallback cache
    CacheSweep,
    /// Inspect the job lock for a user and domain
    Lock { user_id: String, domain: String },
    /// Show rate limit usage for a token
    RateLimit { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let base = cli.url.trim_end_matches('/');
    let (method, path) = match &cli.command {
        Commands::Status => (Method::GET, "/admin/status".to_string()),
        Commands::Health => (Method::GET, "/admin/health".to_string()),
        Commands::Cache => (Method::GET, "/admin/cache".to_string()),
        Commands::CacheClear => (Method::DELETE, "/admin/cache/local".to_string()),
        Commands::CacheSweep => (Method::POST, "/admin/cache/sweep".to_string()),
        // Normalized domains still may contain '/', which cannot be a single path segment.
        Commands::Lock { user_id, domain } => (
            Method::GET,
            format!(
                "/admin/locks/{}/{}",
                user_id,
                normalize_domain(domain).replace('/', "%2F")
            ),
        ),
        Commands::RateLimit { token } => (Method::GET, format!("/admin/rate-limits/{}", token)),
    };

    let res = client
        .request(method, format!("{}{}", base, path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
