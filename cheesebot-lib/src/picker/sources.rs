//! Candidate sources for sound effects and phrases.

use globset::{Glob, GlobMatcher};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::SE_PATTERN;
use crate::error::Result;
use crate::store::{field_eq, Table};

use super::ItemSource;

/// Sound-effect clips directly inside one directory.
pub struct SoundEffects {
    dir: PathBuf,
    matcher: GlobMatcher,
}

impl SoundEffects {
    /// Clips in `dir` whose file name matches `*.raw`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_pattern(dir, SE_PATTERN)
    }

    /// Clips in `dir` whose file name matches `pattern`.
    pub fn with_pattern(dir: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        Ok(Self {
            dir: dir.into(),
            matcher: Glob::new(pattern)?.compile_matcher(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ItemSource for SoundEffects {
    type Item = PathBuf;

    fn all_items(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("no sound effects in {:?}: {}", self.dir, err);
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
            .filter(|entry| self.matcher.is_match(entry.file_name()))
            .map(|entry| entry.path())
            .collect()
    }
}

/// Phrases belonging to one phrase set.
pub struct Phrases {
    table: Table,
    set: String,
}

impl Phrases {
    pub fn new(table: Table, set: impl Into<String>) -> Self {
        Self {
            table,
            set: set.into(),
        }
    }

    pub fn set(&self) -> &str {
        &self.set
    }
}

impl ItemSource for Phrases {
    type Item = String;

    fn all_items(&self) -> Vec<String> {
        self.table
            .search(field_eq("set", self.set.as_str()))
            .into_iter()
            .filter_map(|doc| match doc.get("content") {
                Some(Value::String(content)) => Some(content.clone()),
                _ => {
                    warn!("phrase document without text content in set `{}`", self.set);
                    None
                }
            })
            .collect()
    }
}
