//! LifeDesk trash admin CLI.
//!
//! # Responsibility
//! - Expose the trash verbs of `lifedesk_core` for local inspection and
//!   scripting.
//! - Render every outcome as one JSON envelope on stdout.
//!
//! # Invariants
//! - Kind/id strings are parsed once through `EntityRef::parse`.
//! - Exit status is non-zero whenever `success` is false.

mod output;

use clap::{Parser, Subcommand};
use lifedesk_core::{
    default_log_level, init_logging, open_db, EntityKind, EntityRef, TrashService,
    TrashServiceError,
};
use log::info;
use output::{render, Envelope};
use serde::Serialize;
use std::process::ExitCode;

/// Inspect and manage the LifeDesk trash.
#[derive(Parser)]
#[command(name = "lifedesk", version = lifedesk_core::core_version())]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, env = "LIFEDESK_DB", default_value = "lifedesk.db")]
    db: String,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "LIFEDESK_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "LIFEDESK_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage without touching the database
    Ping,

    /// List trashed entities, newest first
    List {
        #[arg(long)]
        owner: String,

        /// Only list one kind (note|task|folder|journal_entry)
        #[arg(long, value_name = "KIND")]
        kind: Option<String>,
    },

    /// Count trashed entities across all kinds
    Count {
        #[arg(long)]
        owner: String,
    },

    /// Permanently delete every trashed entity of an owner
    Empty {
        #[arg(long)]
        owner: String,
    },

    /// Move an active entity to the trash
    Trash(TargetArgs),

    /// Restore a trashed entity; folders bring back their trashed notes
    Restore(TargetArgs),

    /// Permanently delete one trashed entity
    Purge(TargetArgs),
}

#[derive(clap::Args)]
struct TargetArgs {
    #[arg(long)]
    owner: String,

    /// note|task|folder|journal_entry
    #[arg(value_name = "KIND")]
    kind: String,

    /// UUID, or YYYY-MM-DD for journal entries
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Serialize)]
struct PingData {
    ping: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct TransitionData {
    target: String,
    changed: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            return fail(format!("logging: {err}"));
        }
    }

    match run(&cli) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(message) => fail(message),
    }
}

fn fail(message: String) -> ExitCode {
    println!("{}", render(&Envelope::failure(message)));
    ExitCode::FAILURE
}

fn run(cli: &Cli) -> Result<String, String> {
    info!("event=cli_command module=cli status=start command={}", command_name(&cli.command));

    match &cli.command {
        Command::Ping => Ok(ping_response()),
        Command::List { owner, kind } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            with_service(&cli.db, |service| {
                let records = service.list(owner, kind).map_err(describe)?;
                let message = format!("{} trashed item(s)", records.len());
                Ok(render(&Envelope::ok(records, message)))
            })
        }
        Command::Count { owner } => with_service(&cli.db, |service| {
            let count = service.count(owner).map_err(describe)?;
            Ok(render(&Envelope::ok(count, format!("{count} trashed item(s)"))))
        }),
        Command::Empty { owner } => with_service(&cli.db, |service| {
            let report = service.empty_trash(owner).map_err(describe)?;
            let message = format!("purged {} item(s)", report.total());
            Ok(render(&Envelope::ok(EmptyData::from(report), message)))
        }),
        Command::Trash(args) => {
            let target = parse_target(args)?;
            with_service(&cli.db, |service| {
                let changed = service.soft_delete(target, &args.owner).map_err(describe)?;
                Ok(transition(target, changed, "moved to trash", "nothing to trash"))
            })
        }
        Command::Restore(args) => {
            let target = parse_target(args)?;
            with_service(&cli.db, |service| {
                let report = service.restore(target, &args.owner).map_err(describe)?;
                let message = if report.restored {
                    format!("restored; {} note(s) cascaded", report.cascaded_notes)
                } else {
                    "nothing to restore".to_string()
                };
                Ok(render(&Envelope::ok(
                    RestoreData {
                        target: target.to_string(),
                        restored: report.restored,
                        cascaded_notes: report.cascaded_notes,
                    },
                    message,
                )))
            })
        }
        Command::Purge(args) => {
            let target = parse_target(args)?;
            with_service(&cli.db, |service| {
                let changed = service.purge(target, &args.owner).map_err(describe)?;
                Ok(transition(target, changed, "purged", "nothing to purge"))
            })
        }
    }
}

/// Opens the database only for commands that touch it.
fn with_service<T>(
    db: &str,
    work: impl FnOnce(&TrashService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(db).map_err(|err| format!("database: {err}"))?;
    work(&TrashService::new(&conn))
}

#[derive(Serialize)]
struct RestoreData {
    target: String,
    restored: bool,
    cascaded_notes: u64,
}

#[derive(Serialize)]
struct EmptyData {
    notes: u64,
    tasks: u64,
    folders: u64,
    journal_entries: u64,
    total: u64,
}

impl From<lifedesk_core::EmptyTrashReport> for EmptyData {
    fn from(report: lifedesk_core::EmptyTrashReport) -> Self {
        Self {
            notes: report.notes,
            tasks: report.tasks,
            folders: report.folders,
            journal_entries: report.journal_entries,
            total: report.total(),
        }
    }
}

fn ping_response() -> String {
    let data = PingData {
        ping: lifedesk_core::ping(),
        version: lifedesk_core::core_version(),
    };
    render(&Envelope::ok(data, "ok"))
}

fn transition(target: EntityRef, changed: bool, done: &str, noop: &str) -> String {
    let message = if changed { done } else { noop };
    render(&Envelope::ok(
        TransitionData {
            target: target.to_string(),
            changed,
        },
        message,
    ))
}

fn parse_target(args: &TargetArgs) -> Result<EntityRef, String> {
    EntityRef::parse(&args.kind, &args.id).map_err(|err| format!("invalid argument: {err}"))
}

fn parse_kind(tag: &str) -> Result<EntityKind, String> {
    EntityKind::parse_tag(tag).ok_or_else(|| format!("invalid argument: unknown kind `{tag}`"))
}

fn describe(err: TrashServiceError) -> String {
    err.to_string()
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Ping => "ping",
        Command::List { .. } => "list",
        Command::Count { .. } => "count",
        Command::Empty { .. } => "empty",
        Command::Trash(_) => "trash",
        Command::Restore(_) => "restore",
        Command::Purge(_) => "purge",
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_kind, parse_target, run, Cli, Command, TargetArgs};
    use clap::Parser;
    use lifedesk_core::{EntityKind, EntityRef};

    #[test]
    fn restore_parses_journal_target() {
        let cli = Cli::try_parse_from([
            "lifedesk", "--db", "x.db", "restore", "--owner", "u1", "journal", "2025-03-01",
        ])
        .unwrap();
        let Command::Restore(args) = cli.command else {
            panic!("expected restore");
        };
        assert!(matches!(
            parse_target(&args).unwrap(),
            EntityRef::JournalEntry(_)
        ));
    }

    #[test]
    fn parse_target_rejects_unknown_kind() {
        let args = TargetArgs {
            owner: "u1".to_string(),
            kind: "event".to_string(),
            id: "x".to_string(),
        };
        assert!(parse_target(&args).unwrap_err().starts_with("invalid argument"));
        assert_eq!(parse_kind("folder").unwrap(), EntityKind::Folder);
    }

    #[test]
    fn ping_runs_without_opening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir").join("trash.db");
        let cli = Cli::try_parse_from([
            "lifedesk",
            "--db",
            missing.to_str().unwrap(),
            "ping",
        ])
        .unwrap();

        let out = run(&cli).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["success"], true);
        assert!(!missing.exists());

        let count = Cli::try_parse_from([
            "lifedesk",
            "--db",
            missing.to_str().unwrap(),
            "count",
            "--owner",
            "u1",
        ])
        .unwrap();
        assert!(run(&count).unwrap_err().starts_with("database"));
    }
}
