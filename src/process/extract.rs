// src/process/extract.rs

use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};
use zip::ZipArchive;

use crate::error::{IngestError, Result};

/// Expand every member of `zip_path` into `dest` and return the path of the
/// first listed member.
///
/// Extraction targets `dest` directly, so the process working directory is
/// never touched. Members after the first are extracted too and left where
/// they land.
#[instrument(level = "info", skip(zip_path, dest), fields(zip = %zip_path.display()))]
pub fn unzip_file(zip_path: &Path, dest: &Path) -> Result<PathBuf> {
    let archive_err = |source: zip::result::ZipError| IngestError::Archive {
        path: zip_path.to_path_buf(),
        source,
    };

    let file = File::open(zip_path)
        .map_err(|e| IngestError::io(format!("opening {}", zip_path.display()), e))?;
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;

    if archive.len() == 0 {
        return Err(IngestError::EmptyArchive {
            path: zip_path.to_path_buf(),
        });
    }
    if archive.len() > 1 {
        warn!(members = archive.len(), "archive has more than one member");
    }

    // resolve the first member's name before the archive is borrowed mutably
    let first = {
        let entry = archive.by_index(0).map_err(archive_err)?;
        match entry.enclosed_name() {
            Some(rel) => rel,
            None => {
                return Err(IngestError::UnsafeMember {
                    path: zip_path.to_path_buf(),
                    name: entry.name().to_string(),
                })
            }
        }
    };

    info!("extracting {}", zip_path.display());
    archive.extract(dest).map_err(archive_err)?;

    Ok(dest.join(first))
}
