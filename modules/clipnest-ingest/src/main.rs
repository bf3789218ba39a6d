use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clipnest_common::{Config, PlatformTag};
use clipnest_ingest::pipeline::{ContentPipeline, IngestRequest};

/// Run one content ingestion pass and print the clip draft as JSON.
#[derive(Parser)]
#[command(name = "clipnest-ingest")]
struct Args {
    /// URL to ingest
    url: String,

    /// Platform hint overriding detection
    /// (web, threads, naver, instagram, youtube, twitter)
    #[arg(long)]
    platform: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("clipnest_ingest=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let hint = args.platform.as_deref().and_then(PlatformTag::parse);

    let config = Config::from_env();
    let pipeline = ContentPipeline::from_config(&config);

    let draft = pipeline
        .run(IngestRequest {
            url: args.url,
            hint,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}
