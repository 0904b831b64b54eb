//! Resolve command implementation.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::client::ApiClient;

/// Execute the resolve command against a running server.
pub async fn execute(server: &str, filename: &str) -> Result<()> {
    let client = ApiClient::new(server)?;
    let decision = client
        .post("/resolve", json!({ "filename": filename }))
        .await?;

    let method = decision["mapping_method"].as_str().unwrap_or("unknown");
    let part = decision["mapped_part_number"].as_str();
    let confidence = decision["confidence_score"].as_f64().unwrap_or(0.0);
    let review = decision["requires_manual_review"].as_bool().unwrap_or(true);

    match part {
        Some(part) if !review => {
            println!("{} {}", part.green().bold(), format!("({method})").dimmed());
        }
        Some(part) => {
            println!(
                "{} {} {}",
                part.yellow().bold(),
                format!("({method})").dimmed(),
                "needs review".yellow()
            );
        }
        None => {
            println!("{} {}", "no mapping".red().bold(), format!("({method})").dimmed());
            if let Some(message) = decision["error_message"].as_str() {
                println!("   {} {}", "error:".dimmed(), message.red());
            }
        }
    }

    println!("   {} {:.2}", "confidence:".dimmed(), confidence);
    if let Some(extracted) = decision["extracted_numbers"].as_array() {
        let list: Vec<&str> = extracted.iter().filter_map(|v| v.as_str()).collect();
        if !list.is_empty() {
            println!("   {} {}", "extracted:".dimmed(), list.join(", "));
        }
    }
    if let Some(old) = decision["interchange_mapping"]["old_part_number"].as_str() {
        println!("   {} {} superseded", "interchange:".dimmed(), old);
    }

    Ok(())
}
