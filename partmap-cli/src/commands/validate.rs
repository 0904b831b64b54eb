//! Validate command implementation.

use anyhow::Result;
use colored::Colorize;

use super::client::ApiClient;

/// Execute the validate command against a running server.
pub async fn execute(server: &str, part_number: &str) -> Result<()> {
    let client = ApiClient::new(server)?;
    let response = client
        .get(&format!("/validate/{}", part_number.trim().to_uppercase()))
        .await?;

    let normalized = response["part_number"].as_str().unwrap_or(part_number);
    if response["valid"].as_bool().unwrap_or(false) {
        println!("{} {} is active", "✓".green().bold(), normalized.green());
    } else {
        println!("{} {} is not an active part", "✗".red().bold(), normalized.red());
        std::process::exit(1);
    }

    Ok(())
}
