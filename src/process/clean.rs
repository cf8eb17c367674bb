// src/process/clean.rs

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{IngestError, Result},
    period::Period,
};

const QUOTE: char = '"';
const DELIMITER: char = ',';
const BOM: char = '\u{feff}';

/// Clean one line: drop every quote, then any trailing whitespace and
/// delimiters. Not CSV-aware; quotes inside values go too.
pub fn clean_line(line: &str) -> String {
    let unquoted: String = line.chars().filter(|&c| c != QUOTE).collect();
    unquoted
        .trim_end_matches(|c: char| c.is_whitespace() || c == DELIMITER)
        .to_string()
}

/// Lines are UTF-8 when they can be; anything else is read as ISO-8859-1,
/// which maps every byte to a code point.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(raw.iter().map(|&b| b as char).collect()),
    }
}

/// Deletes a file when dropped, whatever path the owning scope exits by.
struct RemoveOnDrop<'a>(&'a Path);

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        info!("removing old file {}", self.0.display());
        match fs::remove_file(self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %self.0.display(), error = %e, "could not remove old file"),
        }
    }
}

/// Rewrite `csv_file` line by line into `{month}-{year}.csv` next to it and
/// return the new path.
///
/// With `remove_original` the input is deleted on every exit path, including
/// errors. Output is written to an anonymous temp file in the same directory
/// and persisted under the final name only once fully flushed; on failure the
/// temp file is dropped and nothing named like a cleaned file is left behind.
#[instrument(level = "info", skip(csv_file, period), fields(file = %csv_file.display(), period = %period))]
pub fn clean_csv(csv_file: &Path, period: Period, remove_original: bool) -> Result<PathBuf> {
    let dir = csv_file.parent().unwrap_or_else(|| Path::new("."));
    let new_file_name = period.cleaned_file_name();
    let output = dir.join(&new_file_name);
    info!("cleaning {}", csv_file.display());

    let partial = {
        let _cleanup = remove_original.then(|| RemoveOnDrop(csv_file));
        write_cleaned(csv_file, dir)?
    };

    partial.persist(&output).map_err(|e| {
        IngestError::io(
            format!("persisting cleaned file {}", output.display()),
            e.error,
        )
    })?;
    info!("cleaning complete; clean file: {}", new_file_name);
    Ok(output)
}

/// Cleans `input` into a fresh temp file inside `dir`. Dropping the returned
/// handle without persisting it deletes the file.
fn write_cleaned(input: &Path, dir: &Path) -> Result<NamedTempFile> {
    let read_err = |e: io::Error| IngestError::io(format!("reading {}", input.display()), e);
    let write_err =
        |e: io::Error| IngestError::io(format!("writing cleaned copy of {}", input.display()), e);

    let mut reader = BufReader::new(File::open(input).map_err(read_err)?);
    let mut writer = BufWriter::new(NamedTempFile::new_in(dir).map_err(write_err)?);

    let mut buf = Vec::new();
    let mut lines = 0u64;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(read_err)? == 0 {
            break;
        }
        let decoded = decode_line(&buf);
        let text = if lines == 0 {
            decoded.trim_start_matches(BOM)
        } else {
            &decoded[..]
        };
        writer
            .write_all(clean_line(text).as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(write_err)?;
        lines += 1;
    }
    debug!(lines, "cleaned lines written");
    writer.into_inner().map_err(|e| write_err(e.into_error()))
}
