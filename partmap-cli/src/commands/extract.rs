//! Extract command implementation.
//!
//! Runs the filename extractor locally, without a server or database -
//! useful for checking how a naming convention will be read before files
//! land in the intake share.

use anyhow::Result;
use colored::Colorize;

use partmap_core::PartNumberExtractor;

/// Execute the extract command.
pub fn execute(filename: &str, json: bool) -> Result<()> {
    let extractor = PartNumberExtractor::new();
    let candidates = extractor.extract(filename);

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!(
            "{} no candidates found in {}",
            "!".yellow().bold(),
            filename.dimmed()
        );
        return Ok(());
    }

    println!("{} {}", "Candidates for".dimmed(), filename);
    for (rank, candidate) in candidates.iter().enumerate() {
        println!("   {}. {}", rank + 1, candidate.green().bold());
    }

    Ok(())
}
