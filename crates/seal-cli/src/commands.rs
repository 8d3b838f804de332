use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use seal_crypto::DesignFingerprint;
use seal_sdk::{SealSession, StoreConfig};
use seal_store::{BlobStore, MigrationReport, SqliteBlobStore, SqliteStampRegistry};
use seal_types::{BlobId, DesignGrid, StampId};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(dir = %config.mod_data_dir().display(), "using store directory");
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Migrate(args) => cmd_migrate(&config, args, json),
        Command::Blob(args) => cmd_blob(&config, args, json),
        Command::Stamp(args) => cmd_stamp(&config, args, json),
        Command::Fingerprint(args) => cmd_fingerprint(args, json),
    }
}

/// Config file (if any), then command-line overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.data_root {
        config.data_root = root.clone();
    }
    if let Some(save) = &cli.save {
        config.save_id = save.clone();
    }
    config.validate().context("invalid store configuration")?;
    Ok(config)
}

type Session = SealSession<SqliteBlobStore, SqliteStampRegistry>;

fn open_session(config: &StoreConfig) -> anyhow::Result<Session> {
    SealSession::open(config)
        .with_context(|| format!("opening stores in {}", config.mod_data_dir().display()))
}

fn cmd_migrate(config: &StoreConfig, args: MigrateArgs, json: bool) -> anyhow::Result<()> {
    let Some(dir) = args.dir.or_else(|| config.legacy_dir_path()) else {
        bail!("no legacy directory configured; pass --dir");
    };
    let store = SqliteBlobStore::open(config.blob_db_path())
        .with_context(|| format!("opening {}", config.blob_db_path().display()))?;
    let report = store
        .migrate_legacy(&dir)
        .with_context(|| format!("migrating {}", dir.display()))?;

    if json {
        println!("{}", report_json(&report));
    } else {
        print_report(&dir, &report);
    }
    if !report.is_clean() {
        bail!("{} legacy file(s) left behind", report.undeleted.len() + report.failed.len());
    }
    Ok(())
}

fn report_json(report: &MigrationReport) -> serde_json::Value {
    json!({
        "migrated": report.migrated.iter().map(BlobId::as_str).collect::<Vec<_>>(),
        "undeleted": report.undeleted.iter()
            .map(|(id, path)| json!({ "id": id.as_str(), "path": path.display().to_string() }))
            .collect::<Vec<_>>(),
        "failed": report.failed.iter()
            .map(|f| json!({ "path": f.path.display().to_string(), "reason": f.reason }))
            .collect::<Vec<_>>(),
        "skipped": report.skipped,
    })
}

fn print_report(dir: &Path, report: &MigrationReport) {
    println!("Legacy directory {}", dir.display().to_string().bold());
    println!("  {} {} migrated", "✓".green(), report.migrated.len());
    for (id, path) in &report.undeleted {
        println!("  {} {} stored, {} not removed", "!".yellow(), id.short_id(), path.display());
    }
    for failure in &report.failed {
        println!("  {} {}: {}", "✗".red(), failure.path.display(), failure.reason);
    }
    if report.skipped > 0 {
        println!("  {} entries skipped", report.skipped.to_string().dimmed());
    }
}

fn cmd_blob(config: &StoreConfig, args: BlobArgs, json: bool) -> anyhow::Result<()> {
    let session = open_session(config)?;
    match args.action {
        BlobAction::Put { file, creator } => {
            let payload = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let id = session.blobs().insert(&creator, &payload)?;
            if json {
                println!("{}", json!({ "id": id.as_str(), "bytes": payload.len() }));
            } else {
                println!("{} Stored {} bytes as {}", "✓".green().bold(), payload.len(), id.as_str().yellow());
            }
        }
        BlobAction::Get { id, out } => {
            let id = BlobId::parse(&id)?;
            let Some(record) = session.blobs().get(&id)? else {
                bail!("no blob {id}");
            };
            match out {
                Some(path) => {
                    fs::write(&path, &record.payload)
                        .with_context(|| format!("writing {}", path.display()))?;
                    if !json {
                        println!("{} Wrote {} bytes to {}", "✓".green().bold(), record.payload.len(), path.display());
                    }
                }
                None => std::io::stdout().write_all(&record.payload)?,
            }
        }
    }
    Ok(())
}

fn cmd_stamp(config: &StoreConfig, args: StampArgs, json: bool) -> anyhow::Result<()> {
    let session = open_session(config)?;
    match args.action {
        StampAction::Save(args) => {
            let grid = read_design(&args.design)?;
            let id = session.save_stamp_design(&args.title, &args.creator, &grid)?;
            let fingerprint = DesignFingerprint::of_grid(&grid);
            if json {
                println!("{}", json!({ "id": id.get(), "fingerprint": fingerprint.as_str() }));
            } else {
                println!("{} Saved stamp {} ({})", "✓".green().bold(), id.to_string().yellow(), fingerprint);
            }
        }
        StampAction::Show { id } => {
            let record = session.stamp(StampId::new(id))?;
            let grid = record.grid().with_context(|| format!("decoding stamp {id}"))?;
            let fingerprint = DesignFingerprint::of_grid(&grid);
            if json {
                println!(
                    "{}",
                    json!({
                        "id": id,
                        "title": record.title,
                        "creator": record.creator_id,
                        "dimensions": record.dimensions,
                        "fingerprint": fingerprint.as_str(),
                        "design": grid.to_design_string(),
                    })
                );
            } else {
                println!("Stamp {}  {}", id.to_string().yellow().bold(), record.title.bold());
                println!("  Creator: {}", record.creator_id);
                println!("  Size: {0}x{0}, {1} cells engraved", record.dimensions, grid.active_count());
                println!("  Fingerprint: {}", fingerprint.to_string().cyan());
                print!("{grid}");
            }
        }
    }
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs, json: bool) -> anyhow::Result<()> {
    let grid = read_design(&args.design)?;
    let fingerprint = DesignFingerprint::of_grid(&grid);
    if json {
        println!("{}", json!({ "dimensions": grid.dimensions(), "fingerprint": fingerprint.as_str() }));
    } else {
        println!("{fingerprint}");
    }
    Ok(())
}

fn read_design(input: &DesignInput) -> anyhow::Result<DesignGrid> {
    match (&input.design, &input.file) {
        (Some(design), _) => Ok(DesignGrid::from_design_string(design.trim())?),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_design_rows(&text).with_context(|| format!("parsing {}", path.display()))
        }
        (None, None) => bail!("a design is required"),
    }
}

/// One row per non-blank line: `#`/`1` engraved, `.`/`0` blank.
pub fn parse_design_rows(text: &str) -> anyhow::Result<DesignGrid> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .chars()
            .map(|c| match c {
                '#' | '1' => Ok(true),
                '.' | '0' => Ok(false),
                other => bail!("line {}: unexpected {other:?}", line_no + 1),
            })
            .collect::<anyhow::Result<Vec<bool>>>()?;
        rows.push(row);
    }
    Ok(DesignGrid::from_rows(&rows)?)
}
