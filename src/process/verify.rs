// src/process/verify.rs

use std::{
    fs::{self, File},
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{error, info, instrument, warn};

use crate::error::{IngestError, Result};

enum Probe {
    Ok,
    WrongHeader(String),
    NoRows,
}

/// Check that `out_file` starts with `expected` and has at least one data
/// row after it. Only the first data row is looked at.
///
/// On either failure the file is deleted before the error is returned.
#[instrument(level = "info", skip(out_file, expected), fields(file = %out_file.display()))]
pub fn verify_ingest(out_file: &Path, expected: &str) -> Result<()> {
    info!("checking header of {}...", out_file.display());

    // reader is dropped before any delete
    let probe = probe(out_file, expected)?;

    match probe {
        Probe::Ok => {
            info!("has content");
            Ok(())
        }
        Probe::WrongHeader(observed) => {
            remove(out_file);
            let err = IngestError::FormatMismatch {
                path: out_file.to_path_buf(),
                observed,
                expected: expected.to_string(),
            };
            error!("{}", err);
            Err(err)
        }
        Probe::NoRows => {
            remove(out_file);
            let err = IngestError::NoDataAvailable {
                path: out_file.to_path_buf(),
            };
            error!("{}", err);
            Err(err)
        }
    }
}

fn probe(out_file: &Path, expected: &str) -> Result<Probe> {
    let read_err = |e: std::io::Error| IngestError::io(format!("reading {}", out_file.display()), e);
    let file = File::open(out_file).map_err(read_err)?;
    let mut lines = BufReader::new(file).lines();

    let first = lines.next().transpose().map_err(read_err)?.unwrap_or_default();
    let observed = first.trim_end();
    if observed != expected {
        return Ok(Probe::WrongHeader(observed.to_string()));
    }
    info!("...verified");

    info!("checking if some content is present");
    for line in lines {
        if !line.map_err(read_err)?.trim().is_empty() {
            return Ok(Probe::Ok);
        }
    }
    Ok(Probe::NoRows)
}

fn remove(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(file = %path.display(), error = %e, "could not remove rejected file");
    }
}
