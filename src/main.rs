//! snapvault CLI
//!
//! Entry point for the `snapvault` command-line tool.

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use snapvault::{Notice, RecordId, RetentionPolicy, Vault, VaultConfig, VaultError, Version};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snapvault")]
#[command(about = "Versioned snapshots of a content collection", version)]
struct Cli {
    /// Path to config file (default: snapvault.toml in the data directory)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot every managed record into a new version
    Create {
        /// Version description (default: "Auto Backup <date time>")
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List active versions, or the trash
    List {
        /// Show trashed versions with the days left before purge
        #[arg(long)]
        trash: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Compare a version with the live records
    Inspect {
        version: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Restore selected records from a version
    Restore {
        version: String,

        /// Record IDs to restore
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Move one or more versions to the trash
    Trash {
        #[arg(required = true)]
        versions: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Take a version back out of the trash
    Untrash {
        version: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Delete a version and its archive permanently
    Delete {
        version: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Purge trashed versions past the retention window
    Cleanup {
        /// Report what would be purged without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let overrides = match &cli.data_dir {
        Some(dir) => json!({ "data_dir": dir.to_string_lossy() }),
        None => json!({}),
    };
    let config = match VaultConfig::load(cli.config.as_deref(), overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let vault = Vault::open(&config);

    let result = match cli.command {
        Commands::Create { description, json } => run_create(&vault, description, json),
        Commands::List { trash, json } => run_list(&vault, trash, json),
        Commands::Inspect { version, json } => run_inspect(&vault, &version, json),
        Commands::Restore { version, ids, json } => run_restore(&vault, &version, ids, json),
        Commands::Trash { versions, json } => run_trash(&vault, versions, json),
        Commands::Untrash { version, json } => {
            run_single(vault.restore_record(&version), Notice::version_untrashed(), json)
        }
        Commands::Delete { version, json } => {
            run_single(vault.delete_permanently(&version), Notice::version_deleted(), json)
        }
        Commands::Cleanup { dry_run, json } => run_cleanup(&vault, &config, dry_run, json),
    };

    if let Err(e) = result {
        eprintln!("{}", Notice::from(&e));
        if e.notice_text() != e.to_string() {
            eprintln!("  {}", e);
        }
        process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn format_version(v: &Version) -> String {
    format!(
        "{}  {}  {:>4} records  {}",
        v.id,
        v.timestamp.format("%Y-%m-%d %H:%M"),
        v.count,
        v.description
    )
}

fn run_create(vault: &Vault, description: Option<String>, json: bool) -> Result<(), VaultError> {
    let version = vault.create_version(description.as_deref())?;
    if json {
        print_json(&version);
    } else {
        println!("{}", Notice::version_created());
        println!("{}", format_version(&version));
    }
    Ok(())
}

fn run_list(vault: &Vault, trash: bool, json: bool) -> Result<(), VaultError> {
    if trash {
        let trashed = vault.trashed_versions()?;
        if json {
            print_json(&trashed);
            return Ok(());
        }
        if trashed.is_empty() {
            println!("Trash is empty.");
        }
        for t in &trashed {
            println!("{}  ({} days left)", format_version(&t.version), t.days_left);
        }
        return Ok(());
    }

    let active = vault.active_versions()?;
    if json {
        print_json(&active);
        return Ok(());
    }
    if active.is_empty() {
        println!("No versions found.");
    }
    for v in &active {
        println!("{}", format_version(v));
    }
    Ok(())
}

fn run_inspect(vault: &Vault, version: &str, json: bool) -> Result<(), VaultError> {
    let inspection = vault.inspect(version)?;
    if json {
        print_json(&inspection);
        return Ok(());
    }

    println!("{}", format_version(&inspection.version));
    for r in &inspection.records {
        println!(
            "  {:>8}  {:<10} {:<8} {:<40} {}",
            r.id, r.type_label, r.status, r.title, r.action
        );
    }
    Ok(())
}

fn run_restore(vault: &Vault, version: &str, ids: Vec<String>, json: bool) -> Result<(), VaultError> {
    let selected: Vec<RecordId> = ids.into_iter().map(RecordId::from).collect();
    let report = vault.restore_records(version, &selected)?;

    if json {
        print_json(&report);
    } else {
        println!("{}", Notice::records_restored(report.processed()));
        for created in &report.created {
            println!("  {} recreated as {}", created.archived_id, created.new_id);
        }
        for id in &report.not_in_archive {
            println!("  {} is not in this version", id);
        }
        for failed in &report.failed {
            eprintln!("  {} failed: {}", failed.id, failed.reason);
        }
    }

    match report.partial_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_trash(vault: &Vault, versions: Vec<String>, json: bool) -> Result<(), VaultError> {
    if let [single] = versions.as_slice() {
        return run_single(vault.trash(single), Notice::version_trashed(), json);
    }

    let report = vault.bulk_trash(&versions)?;
    if json {
        print_json(&report);
    } else {
        println!("{}", Notice::versions_trashed(report.trashed.len()));
        for id in &report.skipped {
            eprintln!("  {}: version not found", id);
        }
    }

    match report.partial_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_single(
    result: Result<Version, VaultError>,
    notice: Notice,
    json: bool,
) -> Result<(), VaultError> {
    let version = result?;
    if json {
        print_json(&version);
    } else {
        println!("{}", notice);
    }
    Ok(())
}

fn run_cleanup(
    vault: &Vault,
    config: &VaultConfig,
    dry_run: bool,
    json: bool,
) -> Result<(), VaultError> {
    let mut policy: RetentionPolicy = config.retention_policy();
    if dry_run {
        policy = policy.with_dry_run();
    }
    let report = vault.daily_cleanup_with(policy)?;

    if json {
        print_json(&report);
    } else {
        println!("{}", Notice::cleanup_finished(report.purged.len(), report.dry_run));
        for id in &report.purged {
            println!("  {}", id);
        }
        for err in &report.errors {
            eprintln!("  {}", err);
        }
    }
    Ok(())
}
