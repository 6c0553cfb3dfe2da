use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::display;

pub fn run(id: String, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;
    let id = log.resolve_entry_id(&id)?;
    let entry = log
        .get_entry(&id)?
        .with_context(|| format!("Entry not found: {}", id))?;

    display::print_entry_full(&entry);

    if !entry.metadata.is_empty() {
        println!();
        println!("{}", serde_json::to_string_pretty(&entry.metadata)?);
    }

    Ok(())
}
