use clap::{Parser, Subcommand};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use pipeline_config_server::config::schema::DEFAULT_SIGNATURE_HEADER;
use pipeline_config_server::webhook;

#[derive(Parser)]
#[command(name = "pipeline-config-cli")]
#[command(about = "Management CLI for the pipeline configuration server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration served for a repository
    Lookup {
        /// Repository URL as the CI server sends it (repo.git_http_url)
        repo_url: String,
    },
    /// Send a signed refresh request
    Refresh {
        #[arg(short, long)]
        secret: String,

        #[arg(long, default_value = DEFAULT_SIGNATURE_HEADER)]
        header: String,

        /// Raw body to sign and send
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Show index size and last refresh
    Health,
    /// Print the signature for a payload
    Sign {
        #[arg(short, long)]
        secret: String,

        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Lookup { repo_url } => {
            let res = client
                .post(format!("{}/", base))
                .json(&json!({ "repo": { "git_http_url": repo_url } }))
                .send()
                .await?;

            match res.status() {
                StatusCode::OK => {
                    let body: Value = res.json().await?;
                    match body.get("data").and_then(Value::as_str) {
                        Some(data) => print!("{}", data),
                        None => println!("{}", serde_json::to_string_pretty(&body)?),
                    }
                }
                StatusCode::NO_CONTENT => {
                    eprintln!("No override registered, the repository's default applies");
                }
                _ => print_response(res).await?,
            }
        }
        Commands::Refresh {
            secret,
            header,
            payload,
        } => {
            let signature = webhook::sign(payload.as_bytes(), &secret);
            let res = client
                .post(format!("{}/update", base))
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .header(HeaderName::from_bytes(header.as_bytes())?, HeaderValue::from_str(&signature)?)
                .body(payload)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Sign { secret, payload } => {
            println!("{}", webhook::sign(payload.as_bytes(), &secret));
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }
    Ok(())
}
