//! Plain-text battery catalog import
//!
//! Definition files hold one battery per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! fuel-gen: Fuel Generator, power=1100, consume=0.025
//! steam: Steam Engine, power=800, duration=20
//! ```
//!
//! A directory is walked recursively for `*.batteries` files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::Connection;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db::{self, BatteryRecord};

const DEFINITION_EXTENSION: &str = "batteries";

/// Definitions parsed from one file
#[derive(Debug, Default)]
pub struct ParsedDefinitions {
    pub batteries: Vec<BatteryRecord>,
    pub skipped: usize,
}

/// Find all definition files below `dir`
pub fn find_definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == DEFINITION_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Parse definition text. Lines that do not match are counted, not fatal.
pub fn parse_definitions(content: &str) -> Result<ParsedDefinitions> {
    let line_re = Regex::new(
        r"^\s*([\w-]+)\s*:\s*([^,]+?)\s*,\s*power\s*=\s*([\d.]+)\s*,\s*(consume|duration)\s*=\s*([\d.]+)\s*$",
    )?;

    let mut parsed = ParsedDefinitions::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(cap) = line_re.captures(trimmed) else {
            warn!("skipping malformed definition: {}", trimmed);
            parsed.skipped += 1;
            continue;
        };

        let power = cap[3].parse::<f64>().unwrap_or(0.0);
        let amount = cap[5].parse::<f64>().unwrap_or(0.0);
        if power <= 0.0 || amount <= 0.0 {
            warn!("skipping definition with non-positive values: {}", trimmed);
            parsed.skipped += 1;
            continue;
        }

        let record = match &cap[4] {
            "duration" => BatteryRecord::with_duration(&cap[1], &cap[2], power, amount),
            _ => BatteryRecord::new(&cap[1], &cap[2], power, amount),
        };
        parsed.batteries.push(record);
    }

    Ok(parsed)
}

/// Import a definition file, or every definition file below a directory
pub fn import_to_database(conn: &Connection, path: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    let files = if path.is_dir() {
        find_definition_files(path)?
    } else {
        vec![path.to_path_buf()]
    };
    info!("importing {} definition files from {}", files.len(), path.display());

    for file in &files {
        let parsed = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))
            .and_then(|content| parse_definitions(&content));

        match parsed {
            Ok(parsed) => {
                for battery in &parsed.batteries {
                    db::upsert_battery(conn, battery)?;
                }
                info!(
                    "{}: {} batteries, {} skipped",
                    file.display(),
                    parsed.batteries.len(),
                    parsed.skipped
                );
                stats.files += 1;
                stats.batteries += parsed.batteries.len();
                stats.skipped += parsed.skipped;
            }
            Err(e) => {
                warn!("error importing {}: {:#}", file.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub batteries: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} batteries from {} files. Skipped lines: {}, Errors: {}",
            self.batteries, self.files, self.skipped, self.errors
        )
    }
}
