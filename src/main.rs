use std::sync::Arc;

use anyhow::Result;
use gleaner::{config::Config, fetcher::HttpFetcher, harvest::Harvester, policy::Policy};
use tracing_subscriber::EnvFilter;

const ENV_LOG_FORMAT: &str = "GLEANER_LOG_FORMAT";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new(&config)?;
    let policy = Policy::from_config(&config)?;

    let harvester = Harvester::new(config, Arc::new(fetcher), policy);
    let report = harvester.run().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gleaner=info"));

    let json = std::env::var(ENV_LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
