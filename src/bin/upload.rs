use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::multipart;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "upload")]
#[command(about = "Upload images to the blog API and inspect the derived variants")]
struct Args {
    /// Base URL of a running API instance
    #[arg(long, default_value = "http://127.0.0.1:8080", env = "BLOG_API_URL")]
    server: String,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload an image and print the optimization results
    Upload {
        /// Path to the image file
        file: PathBuf,
    },
    /// Delete an uploaded image together with all of its variants
    Delete {
        /// Storage path returned by upload, e.g. images/aB3xY9.jpg
        path: String,
    },
}

#[derive(Deserialize, Serialize, Debug)]
struct UploadResponse {
    message: String,
    path: String,
    url: String,
    original_size: u64,
    optimized_size: u64,
    compression_ratio: String,
    dimensions: Dimensions,
    variants: Variants,
}

#[derive(Deserialize, Serialize, Debug)]
struct Dimensions {
    width: u32,
    height: u32,
}

#[derive(Deserialize, Serialize, Debug)]
struct Variants {
    webp: String,
    thumbnail: String,
    medium: String,
}

#[derive(Deserialize, Debug)]
struct MessageResponse {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let client = reqwest::Client::new();

    match args.command {
        Command::Upload { file } => upload(&client, &args.server, &file, &args.format).await,
        Command::Delete { path } => delete(&client, &args.server, &path).await,
    }
}

async fn upload(
    client: &reqwest::Client,
    server: &str,
    file: &PathBuf,
    format: &str,
) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let part = multipart::Part::bytes(bytes).file_name(file_name);
    let form = multipart::Form::new().part("image", part);

    let response = client
        .post(format!("{}/images", server))
        .multipart(form)
        .send()
        .await
        .context("Upload request failed")?;

    let status = response.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        bail!("Image too large: the limit is 10 MB");
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Upload rejected ({}): {}", status, body);
    }

    let result: UploadResponse = response
        .json()
        .await
        .context("Unexpected upload response body")?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_upload_table(&result),
    }

    Ok(())
}

async fn delete(client: &reqwest::Client, server: &str, path: &str) -> Result<()> {
    let response = client
        .post(format!("{}/images/delete", server))
        .json(&serde_json::json!({ "path": path }))
        .send()
        .await
        .context("Delete request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Delete rejected ({}): {}", status, body);
    }

    let result: MessageResponse = response
        .json()
        .await
        .context("Unexpected delete response body")?;
    println!("{}", result.message);

    Ok(())
}

fn print_upload_table(result: &UploadResponse) {
    println!("\n=== Optimization Results ===\n");
    println!("{}", result.message);
    println!();
    println!("Path:           {}", result.path);
    println!("URL:            {}", result.url);
    println!("Original size:  {:.2} KB", kb(result.original_size));
    println!("Optimized size: {:.2} KB", kb(result.optimized_size));
    println!("Compression:    {} saved", result.compression_ratio);
    println!(
        "Dimensions:     {}x{} px",
        result.dimensions.width, result.dimensions.height
    );
    println!("\n--- Variants ---");
    println!("WebP:       {}", result.variants.webp);
    println!("Thumbnail:  {}", result.variants.thumbnail);
    println!("Medium:     {}", result.variants.medium);
    println!();
}

fn kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}
