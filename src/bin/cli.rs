//! Aurora CLI
//!
//! Command-line client for a running Aurora server:
//! - Search messages
//! - Browse or dump the indexed collection
//! - Trigger a reindex
//! - Check status
//! - Measure search latency against the 100 ms / 30 ms budget

use anyhow::{bail, Context};
use aurora::config::generate_default_config;
use aurora::latency::{LatencyGrade, LatencySummary, REQUIRED_MS, TARGET_MS};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "aurora-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Aurora message search engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8000", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search message bodies and author names
    Search {
        /// Search query
        query: String,
        /// Page number (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Results per page (max 100)
        #[arg(short, long, default_value = "10")]
        size: usize,
    },

    /// Browse indexed messages
    Messages {
        /// Page number (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Results per page (max 1000)
        #[arg(short, long, default_value = "100")]
        size: usize,
        /// Walk every page instead of one
        #[arg(long)]
        all: bool,
        /// Write the fetched messages as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refetch from upstream and rebuild the index
    Reindex,

    /// Show server status
    Status,

    /// Measure search latency
    Bench {
        /// Queries to measure
        #[arg(default_values_t = ["hello".to_string(), "paris".to_string(), "book".to_string()])]
        queries: Vec<String>,
        /// Requests per query
        #[arg(short, long, default_value = "20")]
        iterations: usize,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Search { query, page, size } => {
            let response = client
                .get(format!("{}/search", cli.api_url))
                .query(&[
                    ("query", query.clone()),
                    ("page", page.to_string()),
                    ("size", size.to_string()),
                ])
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;

            let data = expect_json(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!(
                    "{} matches for {:?} (page {}/{})",
                    data["total"],
                    query,
                    data["page"],
                    data["total_pages"]
                );
                println!();
                print_messages(&data["items"]);
                println!();
                println!(
                    "search {:.3}ms, total {:.3}ms - {}",
                    data["search_time_ms"].as_f64().unwrap_or_default(),
                    data["total_time_ms"].as_f64().unwrap_or_default(),
                    data["performance_note"].as_str().unwrap_or("-")
                );
            }
        }

        Commands::Messages {
            page,
            size,
            all,
            output,
        } => {
            let mut collected: Vec<Value> = Vec::new();
            let mut current = page;

            let total = loop {
                let data = fetch_listing(&client, &cli.api_url, current, size).await?;
                let total = data["total"].as_u64().unwrap_or(0);
                let total_pages = data["total_pages"].as_u64().unwrap_or(0) as usize;

                if let Some(items) = data["items"].as_array() {
                    collected.extend(items.iter().cloned());
                }

                if !all || current >= total_pages {
                    break total;
                }
                current += 1;
            };

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&collected)?)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Wrote {} of {} messages to {:?}", collected.len(), total, path);
            } else if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&collected)?);
            } else {
                println!("{} messages indexed, showing {}", total, collected.len());
                println!();
                print_messages(&Value::Array(collected));
            }
        }

        Commands::Reindex => {
            let started = Instant::now();
            let response = client
                .post(format!("{}/reindex", cli.api_url))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;

            let data = expect_json(response).await?;
            println!(
                "{} ({:.1}s)",
                data["message"].as_str().unwrap_or("Reindexed"),
                started.elapsed().as_secs_f64()
            );
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;

            let health = expect_json(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Aurora v{}", health["version"].as_str().unwrap_or("unknown"));
                println!();
                println!("Status: {}", health["status"].as_str().unwrap_or("unknown"));
                println!();
                println!("Index:");
                println!("  Ready: {}", health["index"]["ready"]);
                println!("  Messages: {}", health["index"]["message_count"]);
                println!("  Generation: {}", health["index"]["generation"]);
                if let Some(built_at) = health["index"]["built_at"].as_str() {
                    println!("  Built at: {}", built_at);
                }

                if let Some(last) = health.get("last_reindex").filter(|v| !v.is_null()) {
                    println!();
                    println!("Last reindex:");
                    println!("  Success: {}", last["success"]);
                    println!("  Finished: {}", last["finished_at"].as_str().unwrap_or("-"));
                    if let Some(error) = last["error"].as_str() {
                        println!("  Error: {}", error);
                    }
                }

                if let Some(uptime) = health["uptime_seconds"].as_u64() {
                    println!();
                    println!("Uptime: {}", format_duration(uptime));
                }
            }
        }

        Commands::Bench {
            queries,
            iterations,
        } => {
            if iterations == 0 {
                bail!("iterations must be at least 1");
            }

            let mut all_samples = Vec::new();
            let mut failures = 0;

            println!(
                "Measuring search latency against {} ({} requests per query)",
                cli.api_url, iterations
            );

            for query in &queries {
                let mut samples = Vec::with_capacity(iterations);

                for _ in 0..iterations {
                    let start = Instant::now();
                    let result = client
                        .get(format!("{}/search", cli.api_url))
                        .query(&[("query", query.as_str())])
                        .send()
                        .await;
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                    match result {
                        Ok(resp) if resp.status().is_success() => samples.push(elapsed_ms),
                        _ => failures += 1,
                    }
                }

                println!();
                println!("Query {:?}", query);
                match LatencySummary::from_samples(&samples) {
                    Some(summary) => print_summary(&summary),
                    None => println!("  all requests failed"),
                }
                all_samples.extend(samples);
            }

            println!();
            println!("Overall");
            match LatencySummary::from_samples(&all_samples) {
                Some(summary) => {
                    print_summary(&summary);
                    let within = all_samples.iter().filter(|&&ms| ms < REQUIRED_MS).count();
                    let bonus = all_samples.iter().filter(|&&ms| ms < TARGET_MS).count();
                    println!(
                        "  under {}ms: {}/{}, under {}ms: {}/{}",
                        REQUIRED_MS,
                        within,
                        all_samples.len(),
                        TARGET_MS,
                        bonus,
                        all_samples.len()
                    );
                }
                None => println!("  no successful requests"),
            }

            if failures > 0 {
                println!("  failed requests: {}", failures);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", content);
            }
        }
    }

    Ok(())
}

async fn fetch_listing(
    client: &reqwest::Client,
    api_url: &str,
    page: usize,
    size: usize,
) -> anyhow::Result<Value> {
    let response = client
        .get(format!("{}/messages", api_url))
        .query(&[("page", page), ("size", size)])
        .send()
        .await
        .with_context(|| connect_hint(api_url))?;

    expect_json(response).await
}

async fn expect_json(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("Request failed ({}): {}", status, text);
    }
    Ok(response.json().await?)
}

fn connect_hint(api_url: &str) -> String {
    format!(
        "Cannot connect to Aurora API at {} (start it with: cargo run --bin aurora)",
        api_url
    )
}

fn print_messages(items: &Value) {
    let Some(items) = items.as_array() else {
        return;
    };

    if items.is_empty() {
        println!("No messages.");
        return;
    }

    println!("{:<38} {:<20} {:<26} {}", "ID", "User", "Timestamp", "Message");
    println!("{}", "-".repeat(120));

    for item in items {
        println!(
            "{:<38} {:<20} {:<26} {}",
            item["id"].as_str().unwrap_or("-"),
            truncate(item["user_name"].as_str().unwrap_or("-"), 20),
            item["timestamp"].as_str().unwrap_or("-"),
            truncate(item["message"].as_str().unwrap_or("-"), 60)
        );
    }
}

fn print_summary(summary: &LatencySummary) {
    let grade: LatencyGrade = summary.grade();
    println!(
        "  mean {:.2}ms  median {:.2}ms  min {:.2}ms  max {:.2}ms  stdev {:.2}ms",
        summary.mean, summary.median, summary.min, summary.max, summary.stdev
    );
    println!("  p95 {:.2}ms  p99 {:.2}ms  ({} samples)", summary.p95, summary.p99, summary.samples);
    println!("  {}", grade);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, seconds % 60)
    }
}
