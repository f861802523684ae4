//! CLI `show` command — print one entry with its parsed exchanges.

use anyhow::{bail, Result};

use daybook::config::DaybookConfig;
use daybook::journal::store::JournalStore;
use daybook::journal::types::Exchange;

pub fn show(config: &DaybookConfig, id: &str) -> Result<()> {
    let store = JournalStore::new(config.resolved_journal_dir());
    let Some(entry) = store.entry_by_id(id) else {
        bail!("entry not found: {id}");
    };

    println!("Entry {}", entry.id);
    if let Some(date) = &entry.date {
        println!("Date:    {date}");
    }
    if let Some(title) = &entry.title {
        println!("Title:   {title}");
    }
    if !entry.tags.is_empty() {
        println!("Tags:    {}", entry.tags.join(", "));
    }
    if let Some(weather) = &entry.weather {
        println!("Weather: {weather}");
    }
    if !entry.summary.is_empty() {
        println!("Summary: {}", entry.summary);
    }

    let exchanges = Exchange::parse_blocks(&entry.body);
    if exchanges.is_empty() {
        println!();
        println!("{}", entry.body.trim());
        return Ok(());
    }

    for exchange in exchanges {
        println!();
        if let Some(stamp) = &exchange.timestamp {
            println!("--- {stamp} ---");
        } else {
            println!("---");
        }
        println!("You:   {}", exchange.user);
        println!("Agent: {}", exchange.agent);
    }

    Ok(())
}
