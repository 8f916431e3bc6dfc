use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Invoke a running JSON gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway readiness
    Ready,
    /// Describe an HTTP call and run it through the gateway
    Invoke {
        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(short, long, default_value = "/")]
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// JSON object sent as the request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ready => {
            let res = client.get(format!("{}/ready", cli.url)).send().await?;
            println!("{} {}", res.status(), res.text().await?);
        }
        Commands::Invoke {
            method,
            path,
            query,
            body,
        } => {
            let mut request = json!({ "method": method, "path": path });
            if !query.is_empty() {
                let query: Map<String, Value> =
                    query.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
                request["query"] = Value::Object(query);
            }
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body)?;
                if !body.is_object() {
                    return Err("--body must be a JSON object".into());
                }
                request["body"] = body;
            }

            let res = client
                .post(format!("{}/gateway", cli.url))
                .json(&request)
                .send()
                .await?;
            print_envelope(res).await?;
        }
    }

    Ok(())
}

async fn print_envelope(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let envelope: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Error: gateway returned status {}", status);
            eprintln!("Response: {}", text);
            return Ok(());
        }
    };

    if envelope["success"].as_bool() == Some(true) {
        println!(
            "Status: {} {}",
            envelope["status-code"],
            envelope["status-message"].as_str().unwrap_or_default()
        );
        println!("Headers:");
        if let Some(headers) = envelope["headers"].as_object() {
            for (name, value) in headers {
                println!("  {}: {}", name, value.as_str().unwrap_or_default());
            }
        }
        println!("Content:");
        println!("{}", envelope["body"].as_str().unwrap_or_default());
    } else {
        eprintln!(
            "{}: {}",
            envelope["error"].as_str().unwrap_or("error"),
            envelope["reason"].as_str().unwrap_or_default()
        );
    }
    Ok(())
}
