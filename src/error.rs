// src/error.rs

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::period::Period;

/// Boxed error produced by an object-store backend.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum IngestError {
    // ── Fetch ────────────────────────────────────────────────────────────────
    #[error("download for {period} failed: {source}")]
    Transport {
        period: Period,
        #[source]
        source: reqwest::Error,
    },

    // ── Archive ──────────────────────────────────────────────────────────────
    #[error("cannot read archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("archive {} has no members", .path.display())]
    EmptyArchive { path: PathBuf },

    #[error("archive {} holds a member with an unsafe name: {name}", .path.display())]
    UnsafeMember { path: PathBuf, name: String },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("in {} got header: {observed}\n expected: {expected}", .path.display())]
    FormatMismatch {
        path: PathBuf,
        observed: String,
        expected: String,
    },

    #[error("{} has header with no content", .path.display())]
    NoDataAvailable { path: PathBuf },

    // ── Publish ──────────────────────────────────────────────────────────────
    #[error("object store error for {bucket}/{key}: {source}")]
    Store {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("object store client could not be created: {0}")]
    StoreConnect(#[source] StoreError),

    // ── Local ────────────────────────────────────────────────────────────────
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IngestError {
    /// Only a header-only extract is worth retrying later; everything else
    /// stops the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::NoDataAvailable { .. })
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        IngestError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
