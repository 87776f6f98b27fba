use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "pool-cli")]
#[command(about = "Management CLI for the replica router admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8091")]
    url: String,

    #[arg(short, long, env = "REPLICA_ROUTER_API_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Status of every group
    Status,
    /// Status of one group
    Group { name: String },
    /// Run a probe pass on a group now
    Probe { name: String },
    /// Start the heartbeat of a group
    HeartbeatStart {
        name: String,
        /// Interval in milliseconds (server default when omitted)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Stop the heartbeat of a group
    HeartbeatStop { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)),
        Commands::Group { name } => client.get(format!("{}/admin/groups/{}/status", base, name)),
        Commands::Probe { name } => client.post(format!("{}/admin/groups/{}/probe", base, name)),
        Commands::HeartbeatStart { name, interval_ms } => {
            let req = client.post(format!("{}/admin/groups/{}/heartbeat", base, name));
            match interval_ms {
                Some(ms) => req.query(&[("interval_ms", ms)]),
                None => req,
            }
        }
        Commands::HeartbeatStop { name } => {
            client.delete(format!("{}/admin/groups/{}/heartbeat", base, name))
        }
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
