//! Cache refresh command implementation.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::client::ApiClient;

/// Execute the refresh-cache command against a running server.
pub async fn execute(server: &str) -> Result<()> {
    let client = ApiClient::new(server)?;
    let response = client.post("/cache/refresh", json!({})).await?;

    let mappings = response["mappings"].as_u64().unwrap_or(0);
    if mappings == 0 {
        println!(
            "{} cache is empty (parts database unreachable?)",
            "!".yellow().bold()
        );
    } else {
        println!("{} {} interchange mappings loaded", "✓".green().bold(), mappings);
    }

    Ok(())
}
