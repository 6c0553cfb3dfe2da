use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worklog_core::Operation;

mod commands;
mod display;

use commands::{branch, destroy, diff, init, log, record, show, summary, tag};

#[derive(Parser)]
#[command(name = "worklog")]
#[command(version, about = "Branching operation log for generated projects", long_about = None)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short = 'C', long, global = true, env = "WORKLOG_PROJECT")]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty log with the default branch
    Init {
        /// Project id stored on every entry (defaults to the directory name)
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Record an entry on a branch
    Record {
        /// Operation kind, e.g. file-create, build-complete, ai-generate
        operation: Operation,

        /// Entry message
        message: String,

        /// Human or agent responsible for the change
        #[arg(short, long, default_value = "cli-user")]
        author: String,

        /// Branch to record on (defaults to the default branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Path added by this entry
        #[arg(long = "added", value_name = "PATH")]
        added: Vec<String>,

        /// Path modified by this entry
        #[arg(long = "modified", value_name = "PATH")]
        modified: Vec<String>,

        /// Path deleted by this entry
        #[arg(long = "deleted", value_name = "PATH")]
        deleted: Vec<String>,

        /// Rename, given as OLD=NEW
        #[arg(long = "renamed", value_name = "OLD=NEW")]
        renamed: Vec<String>,

        /// Tag to attach
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Metadata pair KEY=VALUE (VALUE is parsed as JSON when possible)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Show entry history for a branch
    Log {
        /// Branch to walk (defaults to the default branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Only these operations
        #[arg(long = "operation")]
        operations: Vec<Operation>,

        /// Only entries by this author
        #[arg(long)]
        author: Option<String>,

        /// Only entries at or after this RFC 3339 time
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only entries at or before this RFC 3339 time
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Only entries carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Case-insensitive match on message or changed paths
        #[arg(short, long)]
        search: Option<String>,

        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of entries to skip
        #[arg(long)]
        offset: Option<usize>,

        /// One line per entry
        #[arg(long)]
        oneline: bool,
    },

    /// Show a single entry
    Show {
        /// Entry id or unique prefix
        id: String,
    },

    /// Show the net file changes between two entries
    Diff {
        /// Last entry of the range (id or unique prefix)
        to: String,

        /// First entry of the range (defaults to the start of history)
        #[arg(long)]
        from: Option<String>,

        /// Resolve both entries on this branch instead of the default branch
        #[arg(short, long)]
        branch: Option<String>,

        /// Print the diff as JSON
        #[arg(long)]
        json: bool,
    },

    /// List, create or delete branches
    Branch {
        #[command(subcommand)]
        command: Option<BranchCommand>,
    },

    /// Add a tag to an entry
    Tag {
        /// Entry id or unique prefix
        id: String,
        tag: String,
    },

    /// Remove a tag from an entry
    Untag {
        /// Entry id or unique prefix
        id: String,
        tag: String,
    },

    /// Show aggregate counts for the log
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Permanently delete the log
    Destroy {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// List branches
    List,

    /// Create a branch at another branch's head
    Create {
        name: String,

        /// Source branch (defaults to the default branch)
        #[arg(long)]
        from: Option<String>,
    },

    /// Delete a branch
    Delete { name: String },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project = cli.project;

    match cli.command {
        Commands::Init { project_id } => {
            init::run(project_id, project)?;
        }
        Commands::Record {
            operation,
            message,
            author,
            branch,
            added,
            modified,
            deleted,
            renamed,
            tags,
            meta,
        } => {
            let args = record::RecordArgs {
                operation,
                message,
                author,
                branch,
                added,
                modified,
                deleted,
                renamed,
                tags,
                meta,
            };
            record::run(args, project)?;
        }
        Commands::Log {
            branch,
            operations,
            author,
            since,
            until,
            tags,
            search,
            limit,
            offset,
            oneline,
        } => {
            let filter = worklog_core::LogFilter {
                operations,
                author,
                since,
                until,
                tags,
                search,
                limit,
                offset,
            };
            log::run(branch, filter, oneline, project)?;
        }
        Commands::Show { id } => {
            show::run(id, project)?;
        }
        Commands::Diff {
            to,
            from,
            branch,
            json,
        } => {
            diff::run(from, to, branch, json, project)?;
        }
        Commands::Branch { command } => match command.unwrap_or(BranchCommand::List) {
            BranchCommand::List => branch::list(project)?,
            BranchCommand::Create { name, from } => branch::create(name, from, project)?,
            BranchCommand::Delete { name } => branch::delete(name, project)?,
        },
        Commands::Tag { id, tag: name } => {
            tag::run(id, name, false, project)?;
        }
        Commands::Untag { id, tag: name } => {
            tag::run(id, name, true, project)?;
        }
        Commands::Summary { json } => {
            summary::run(json, project)?;
        }
        Commands::Destroy { yes } => {
            destroy::run(yes, project)?;
        }
    }

    Ok(())
}
