//! CLI `scan` command — check every journal document and report problems.

use anyhow::{Context, Result};
use std::fs;

use daybook::config::DaybookConfig;
use daybook::journal::frontmatter;

/// Walk the journal directory and report unreadable or unparsable documents,
/// plus any sidecars left behind by append-time rescues.
pub fn scan(config: &DaybookConfig) -> Result<()> {
    let dir = config.resolved_journal_dir();
    if !dir.exists() {
        println!("Journal: not found at {}", dir.display());
        println!("Run `daybook serve` and post a message to create it.");
        return Ok(());
    }

    let mut checked = 0usize;
    let mut problems: Vec<(String, String)> = Vec::new();
    let mut sidecars: Vec<String> = Vec::new();

    let mut names: Vec<String> = fs::read_dir(&dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect();
    names.sort();

    for name in names {
        if name.ends_with(".md.unparsed") {
            sidecars.push(name);
            continue;
        }
        if !name.ends_with(".md") {
            continue;
        }
        checked += 1;
        match fs::read_to_string(dir.join(&name)) {
            Ok(raw) => {
                if let Err(err) = frontmatter::decode(&raw) {
                    problems.push((name, format!("frontmatter parse error: {err}")));
                }
            }
            Err(err) => problems.push((name, format!("read error: {err}"))),
        }
    }

    println!("Journal Scan");
    println!("============");
    println!();
    println!("Directory:   {}", dir.display());
    println!("Documents:   {checked}");
    println!();
    if problems.is_empty() {
        println!("No problematic journal files found.");
    } else {
        println!("Problematic files:");
        for (name, reason) in &problems {
            println!("  - {name}: {reason}");
        }
    }
    if !sidecars.is_empty() {
        println!();
        println!("Rescued sidecars (originals preserved before a rewrite):");
        for name in &sidecars {
            println!("  - {name}");
        }
    }

    Ok(())
}
