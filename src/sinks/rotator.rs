//! Size-triggered rotation of the active log file
//!
//! After each successful file flush the rotator compares the on-disk size of
//! `{base_name}.log` with the configured maximum. Once the limit is reached
//! it closes the handle, renames the file to
//! `{base_name}_{YYYYMMDD_HHMMSS}.log` (wall-clock time of the rotation),
//! reopens a fresh file at the original path and prunes rotated files beyond
//! the retention count.

use crate::core::config::{LoggerConfig, LOG_FILE_EXTENSION, ROTATION_TIMESTAMP_FORMAT};
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Open `path` for appending, creating it and its parent directory if needed
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e)))
}

/// Current size of `path`, 0 if it does not exist
fn file_size(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Ok(0),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(LoggerError::io_operation(
            "check log file size",
            format!("Cannot read metadata of '{}'", path.display()),
            e,
        )),
    }
}

#[derive(Debug, Clone)]
pub struct Rotator {
    enabled: bool,
    max_bytes: u64,
    keep: u32,
    config: LoggerConfig,
}

impl Rotator {
    pub fn new(config: &LoggerConfig) -> Self {
        Self {
            enabled: config.rotate,
            max_bytes: config.file_max_bytes,
            keep: config.file_count,
            config: config.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn active_path(&self) -> PathBuf {
        self.config.active_file_path()
    }

    /// Whether the active file has reached the size limit
    pub fn needs_rotation(&self) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        Ok(file_size(&self.active_path())? >= self.max_bytes)
    }

    /// Rotate the active file if it is over the limit
    ///
    /// Below the limit (or with rotation disabled) nothing happens and
    /// `handle` is left untouched. Otherwise returns the path the old file
    /// was renamed to. If the rename fails the active file is reopened so
    /// logging continues, and the rename error is returned.
    pub fn rotate_if_needed(&self, handle: &mut Option<File>) -> Result<Option<PathBuf>> {
        if !self.needs_rotation()? {
            return Ok(None);
        }

        let target = self.unique_rotated_path(Local::now());
        self.rotate_to(handle, &target)?;

        if let Err(e) = self.prune() {
            eprintln!("[LOGGER WARNING] Failed to prune rotated log files: {}", e);
        }
        Ok(Some(target))
    }

    /// Close `handle`, move the active file to `target` and reopen the active path
    ///
    /// The active file is reopened even when the rename fails.
    fn rotate_to(&self, handle: &mut Option<File>, target: &Path) -> Result<()> {
        let active = self.active_path();
        // Close before renaming
        drop(handle.take());

        let renamed = fs::rename(&active, target);

        *handle = Some(open_log_file(&active)?);

        renamed.map_err(|e| {
            LoggerError::file_rotation(
                active.display().to_string(),
                format!("Failed to rename to '{}': {}", target.display(), e),
            )
        })
    }

    /// Rotated file name for `now`, suffixed `_1`, `_2`, ... if that second is already taken
    ///
    /// The counter continues above the highest one on disk for the same
    /// second, so a name freed by pruning is never reused for a newer file.
    fn unique_rotated_path(&self, now: DateTime<Local>) -> PathBuf {
        let stamp = now.format(ROTATION_TIMESTAMP_FORMAT).to_string();
        let start = self
            .rotated_entries()
            .unwrap_or_default()
            .into_iter()
            .filter(|((taken, _), _)| *taken == stamp)
            .map(|((_, counter), _)| counter.saturating_add(1))
            .max()
            .unwrap_or(0);

        let path_for = |counter: u32| match counter {
            0 => self.config.rotated_file_path(&stamp),
            n => self.config.rotated_file_path(&format!("{}_{}", stamp, n)),
        };
        (start..)
            .map(path_for)
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| path_for(start))
    }

    /// Rotated files of this logger, oldest first
    pub fn rotated_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .rotated_entries()?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn rotated_entries(&self) -> Result<Vec<((String, u32), PathBuf)>> {
        let dir = self.config.log_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LoggerError::io_operation(
                    "list rotated log files",
                    format!("Cannot read directory '{}'", dir.display()),
                    e,
                ))
            }
        };

        let mut found: Vec<((String, u32), PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let key = parse_rotated_name(&name, &self.config.base_name)?;
                Some((key, entry.path()))
            })
            .collect();
        found.sort();
        Ok(found)
    }

    /// Delete the oldest rotated files so at most `file_count` remain
    ///
    /// A `file_count` of 0 keeps everything.
    pub fn prune(&self) -> Result<Vec<PathBuf>> {
        if self.keep == 0 {
            return Ok(Vec::new());
        }
        let rotated = self.rotated_files()?;
        let excess = rotated.len().saturating_sub(self.keep as usize);
        let mut removed = Vec::with_capacity(excess);
        for path in rotated.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => removed.push(path),
                Err(e) => eprintln!(
                    "[LOGGER WARNING] Failed to remove old log file {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        Ok(removed)
    }
}

/// Sort key of `{base}_{YYYYMMDD_HHMMSS}[_{n}].log`, `None` for any other name
fn parse_rotated_name(name: &str, base: &str) -> Option<(String, u32)> {
    let rest = name
        .strip_prefix(base)?
        .strip_prefix('_')?
        .strip_suffix(LOG_FILE_EXTENSION)?
        .strip_suffix('.')?;

    // YYYYMMDD_HHMMSS is 15 characters
    if rest.len() < 15 || !rest.is_char_boundary(15) {
        return None;
    }
    let (stamp, suffix) = rest.split_at(15);
    let well_formed = stamp
        .char_indices()
        .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() });
    if !well_formed {
        return None;
    }
    let counter = match suffix {
        "" => 0,
        _ => suffix.strip_prefix('_')?.parse().ok()?,
    };
    Some((stamp.to_string(), counter))
}
