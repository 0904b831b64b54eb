//! Suggest command implementation.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::client::ApiClient;

/// Execute the suggest command against a running server.
pub async fn execute(server: &str, prefix: &str) -> Result<()> {
    let client = ApiClient::new(server)?;
    let response = client
        .post("/suggest", json!({ "partial_input": prefix }))
        .await?;

    let suggestions = response["suggestions"].as_array().cloned().unwrap_or_default();
    if suggestions.is_empty() {
        println!(
            "{} no active parts match {}",
            "!".yellow().bold(),
            format!("{prefix}*").dimmed()
        );
        return Ok(());
    }

    for suggestion in &suggestions {
        let part = suggestion["part_number"].as_str().unwrap_or("?");
        let description = suggestion["description"].as_str().unwrap_or("");
        let brand = suggestion["brand"].as_str();

        match brand {
            Some(brand) => println!(
                "   {}  {} {}",
                part.green().bold(),
                description,
                format!("[{brand}]").dimmed()
            ),
            None => println!("   {}  {}", part.green().bold(), description),
        }
    }

    Ok(())
}
