use clap::{Parser, Subcommand};
use reqwest::header::ORIGIN;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Client for a running chat relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8787")]
    url: String,

    /// Origin header to send, as a browser would.
    #[arg(short, long, default_value = "http://localhost:5173")]
    origin: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the relay's answer
    Send {
        message: String,
        /// Wrap the message as {messages:[{role:"user",...}]} instead of {message}
        #[arg(long)]
        as_messages: bool,
    },
    /// Send a CORS preflight and print the granted headers
    Preflight,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Send { message, as_messages } => {
            let body = if as_messages {
                json!({ "messages": [{ "role": "user", "content": message }] })
            } else {
                json!({ "message": message })
            };
            let res = client
                .post(&cli.url)
                .header(ORIGIN, &cli.origin)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Preflight => {
            let res = client
                .request(reqwest::Method::OPTIONS, &cli.url)
                .header(ORIGIN, &cli.origin)
                .header("Access-Control-Request-Method", "POST")
                .send()
                .await?;
            println!("Status: {}", res.status());
            for (name, value) in res.headers() {
                if name.as_str().starts_with("access-control-") || name.as_str() == "vary" {
                    println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;

    if status.is_success() {
        match json.get("reply").and_then(Value::as_str) {
            Some(reply) => println!("{}", reply),
            None => println!("{}", serde_json::to_string_pretty(&json)?),
        }
    } else {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
