use colored::Colorize;
use worklog_core::{file_count, format_entry_full, Entry};

/// Colored variant of [`worklog_core::format_entry_oneline`].
pub fn entry_oneline(entry: &Entry) -> String {
    format!(
        "{} {} {} {}",
        entry.short_id().yellow(),
        format!("[{}]", entry.operation).cyan(),
        entry.message,
        format!("({})", file_count(entry)).dimmed()
    )
}

pub fn print_entry_full(entry: &Entry) {
    let text = format_entry_full(entry);
    for line in text.lines() {
        let trimmed = line.trim_start();
        if line.starts_with("entry ") {
            println!("{}", line.yellow().bold());
        } else if trimmed.starts_with("+ ") {
            println!("{}", line.green());
        } else if trimmed.starts_with("- ") {
            println!("{}", line.red());
        } else if trimmed.starts_with("M ") {
            println!("{}", line.yellow());
        } else if trimmed.starts_with("R ") {
            println!("{}", line.blue());
        } else {
            println!("{line}");
        }
    }
}
