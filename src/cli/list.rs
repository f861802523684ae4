//! CLI `list` command — print entry summaries, newest first.

use anyhow::Result;

use daybook::config::DaybookConfig;
use daybook::journal::store::JournalStore;

pub fn list(config: &DaybookConfig) -> Result<()> {
    let store = JournalStore::new(config.resolved_journal_dir());
    let entries = store.list_entries()?;

    if entries.is_empty() {
        println!("No journal entries yet.");
        return Ok(());
    }

    for entry in entries {
        let date = entry.date.as_deref().unwrap_or("(no date)");
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", entry.tags.join(", "))
        };
        println!("{date}  {}{tags}", entry.id);
        if !entry.summary.is_empty() {
            println!("    {}", entry.summary);
        }
    }

    Ok(())
}
