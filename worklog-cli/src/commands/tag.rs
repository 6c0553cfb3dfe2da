use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(id: String, tag: String, remove: bool, project: Option<PathBuf>) -> Result<()> {
    let log = super::open_log(project)?;
    let id = log.resolve_entry_id(&id)?;

    let applied = if remove {
        log.untag_entry(&id, &tag)?
    } else {
        log.tag_entry(&id, &tag)?
    };

    match (applied, remove) {
        (true, false) => println!("{} {} {}", "✓ Tagged".green().bold(), id, tag.cyan()),
        (true, true) => println!("{} {} from {}", "✓ Removed tag".green().bold(), tag.cyan(), id),
        (false, false) => println!("{}", format!("{} already carries {}", id, tag).yellow()),
        (false, true) => println!("{}", format!("{} does not carry {}", id, tag).yellow()),
    }

    Ok(())
}
