use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Parser)]
#[command(name = "balancer-cli")]
#[command(about = "Management CLI for the health-aware load balancer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check balancer status
    Status,
    /// List backends and their health
    Backends,
    /// Mark a backend healthy (e.g. after starting it)
    MarkHealthy { address: String },
    /// Mark a backend unhealthy
    MarkUnhealthy { address: String },
    /// Tail the live event feed
    Watch {
        #[arg(long, default_value = "/ws")]
        path: String,
    },
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

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Backends => {
            let res = client.get(format!("{}/admin/backends", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::MarkHealthy { address } => {
            set_health(&client, &cli.url, headers, &address, true).await?;
        }
        Commands::MarkUnhealthy { address } => {
            set_health(&client, &cli.url, headers, &address, false).await?;
        }
        Commands::Watch { path } => {
            watch(&cli.url, &path).await?;
        }
    }

    Ok(())
}

async fn set_health(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    address: &str,
    healthy: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let res = client.put(format!("{}/admin/backends/health", url))
        .headers(headers)
        .json(&json!({ "address": address, "healthy": healthy }))
        .send()
        .await?;
    print_response(res).await
}

async fn watch(url: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ws_url = format!("{}{}", url.replacen("http", "ws", 1), path);
    let (mut stream, _) = connect_async(ws_url.as_str()).await?;
    eprintln!("Connected to {}", ws_url);

    while let Some(message) = stream.next().await {
        match message? {
            Message::Text(text) => println!("{}", text.as_str()),
            Message::Close(_) => break,
            _ => {}
        }
    }

    eprintln!("Feed closed");
    Ok(())
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
