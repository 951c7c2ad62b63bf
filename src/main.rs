//! CRM API command line client
//!
//! Issues a single request through the resilient client and prints the
//! normalized envelope as JSON

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use crm_api_client::utils::logging::init_logging;
use crm_api_client::{ApiClient, ApiResponse, Endpoint, HttpMethod, RequestConfig, Settings};

#[derive(Parser)]
#[command(name = "crm-api-client")]
#[command(about = "Send requests to the CRM backend", long_about = None)]
struct Cli {
    /// Base URL, overriding every other source
    #[arg(long)]
    base_url: Option<String>,

    /// Per-attempt deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable retries for this request
    #[arg(long)]
    no_retry: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource
    Get(RequestArgs),
    /// POST a JSON body
    Post(RequestArgs),
    /// PUT a JSON body
    Put(RequestArgs),
    /// PATCH a JSON body
    Patch(RequestArgs),
    /// DELETE a resource
    Delete(RequestArgs),
}

#[derive(Args)]
struct RequestArgs {
    /// Endpoint path, e.g. /clients
    path: String,

    /// Query parameter as key=value; repeatable
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load client settings")?;
    init_logging(&settings.logging);

    if let Some(base_url) = cli.base_url {
        settings.api.base_url_override = Some(base_url);
    }

    let client = ApiClient::builder()
        .settings(settings)
        .build()
        .context("Failed to build API client")?;
    info!("Using API base URL {}", client.config().base_url()?);

    let (method, args) = match cli.command {
        Commands::Get(args) => (HttpMethod::Get, args),
        Commands::Post(args) => (HttpMethod::Post, args),
        Commands::Put(args) => (HttpMethod::Put, args),
        Commands::Patch(args) => (HttpMethod::Patch, args),
        Commands::Delete(args) => (HttpMethod::Delete, args),
    };

    let mut endpoint = Endpoint::new(args.path);
    for pair in &args.query {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid query parameter '{}', expected KEY=VALUE", pair);
        };
        endpoint = endpoint.query(key, value);
    }

    let mut config = RequestConfig::new(method);
    if let Some(data) = args.data {
        let body: Value = serde_json::from_str(&data).context("Request body is not valid JSON")?;
        config = config.body(body);
    }
    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }
    if cli.no_retry {
        config = config.no_retry();
    }

    let response: ApiResponse<Value> = client.request(endpoint, config).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
