// src/config.rs

use std::{ops::RangeInclusive, path::PathBuf};

use crate::error::{IngestError, Result};

/// Download form for the On-Time Performance table.
pub const DEFAULT_ENDPOINT: &str =
    "https://www.transtats.bts.gov/DownLoad_Table.asp?Table_ID=236&Has_Group=3&Is_Zipped=0";

pub const DEFAULT_TEMP_PREFIX: &str = "ingest_flights";

pub const DEFAULT_KEY_PREFIX: &str = "flights/raw";

/// Everything the ingestor needs to know about where things go.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Destination bucket.
    pub bucket: String,
    /// Parent directory for per-period workspaces.
    pub work_root: PathBuf,
    /// Name prefix for each workspace directory.
    pub temp_prefix: String,
    /// Object key prefix; keys are `{key_prefix}/{month}-{year}.csv`.
    pub key_prefix: String,
    /// Delete the raw extracted file once it has been cleaned.
    pub remove_original: bool,
}

impl IngestConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            work_root: std::env::temp_dir(),
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            remove_original: true,
        }
    }

    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn with_remove_original(mut self, remove_original: bool) -> Self {
        self.remove_original = remove_original;
        self
    }

    /// Fails on settings that would produce unusable object keys.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(IngestError::Config("bucket name is empty".into()));
        }
        if self.bucket.contains('/') {
            return Err(IngestError::Config(format!(
                "bucket name `{}` must not contain '/'",
                self.bucket
            )));
        }
        Ok(())
    }

    /// Object key for a cleaned file name, e.g. `flights/raw/03-2020.csv`.
    pub fn object_key(&self, file_name: &str) -> String {
        let prefix = self.key_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }
}

/// Inclusive year range from the command line.
pub fn year_range(start_year: i32, end_year: i32) -> Result<RangeInclusive<i32>> {
    if start_year > end_year {
        return Err(IngestError::Config(format!(
            "start year {} is after end year {}",
            start_year, end_year
        )));
    }
    Ok(start_year..=end_year)
}
