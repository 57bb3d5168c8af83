//! Markdown sync journal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data::{Collection, Mode, SyncStatus};

/// Journal of data manager activity.
///
/// Entries are appended to a markdown file so an operator can read back when
/// collections were seeded, which reads fell back to the cache and whether
/// remote pushes landed. Console diagnostics are the caller's `tracing` job.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to journal file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO"). At "ERROR" only failures are journaled.
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => std::env::temp_dir().join("santseva-logs").join(format!(
                "sync_{}_{}.md",
                Utc::now().timestamp_millis(),
                std::process::id()
            )),
        };

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level: log_level.unwrap_or("INFO").to_uppercase(),
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        writeln!(file, "# Santseva Sync Journal\n")?;
        writeln!(file, "Log started: {}\n", Utc::now().to_rfc3339())?;
        writeln!(file, "---\n")?;
        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        file.write_all(content.as_bytes())
            .with_context(|| "Failed to write to log file")?;
        Ok(())
    }

    fn errors_only(&self) -> bool {
        self.log_level == "ERROR"
    }

    fn entry(&self, title: &str, body: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        self.append_to_log(&format!("### {} - {}\n\n{}\n\n", title, now.to_rfc3339(), body))
    }

    /// Log manager start-up.
    pub fn log_manager_start(&self, mode: Mode, data_dir: &Path) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "## Data Manager Started - {}\n\n**Mode:** {}\n**Data dir:** {}\n\n",
            now.to_rfc3339(),
            mode,
            data_dir.display()
        );

        self.append_to_log(&content)?;
        Ok(())
    }

    /// Log a switch of the active backend.
    pub fn log_mode_change(&self, old_mode: Mode, new_mode: Mode) -> Result<()> {
        if !self.errors_only() {
            self.entry(
                "Mode Changed",
                &format!("**From:** {}\n**To:** {}", old_mode, new_mode),
            )?;
        }
        Ok(())
    }

    /// Log that a collection was seeded with demo data.
    pub fn log_seed(&self, collection: Collection, records: usize) -> Result<()> {
        if !self.errors_only() {
            self.entry(
                "Seeded",
                &format!("**Collection:** {}\n**Records:** {}", collection, records),
            )?;
        }
        Ok(())
    }

    /// Log a remote read that fell back to the local tier.
    pub fn log_fetch_fallback(&self, collection: Collection, mode: Mode, reason: &str) -> Result<()> {
        if !self.errors_only() {
            self.entry(
                "Fetch Fallback",
                &format!(
                    "**Collection:** {}\n**Backend:** {}\n**Reason:** {}",
                    collection, mode, reason
                ),
            )?;
        }
        Ok(())
    }

    /// Log the outcome of a remote push.
    pub fn log_sync(&self, collection: Collection, status: &SyncStatus) -> Result<()> {
        match status {
            SyncStatus::Failed { .. } => {
                self.entry(
                    "Sync Failed",
                    &format!("**Collection:** {}\n**Status:** {}", collection, status),
                )?;
            }
            _ => {
                if !self.errors_only() {
                    self.entry(
                        "Sync",
                        &format!("**Collection:** {}\n**Status:** {}", collection, status),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Log error with context.
    pub fn log_error(&self, error: &str, context: Option<&str>) -> Result<()> {
        let mut content = format!("**Error:** {}", error);
        if let Some(ctx) = context {
            content.push_str(&format!("\n**Context:** {}", ctx));
        }

        self.entry("Error", &content)?;
        Ok(())
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
