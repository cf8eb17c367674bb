// src/fetch/mod.rs

use std::path::{Path, PathBuf};

use crate::{error::Result, period::Period};

pub mod query;
pub mod zips;

pub use zips::HttpSource;

/// Something that can materialise a period's archive inside a workspace.
#[allow(async_fn_in_trait)]
pub trait Source {
    /// Writes the archive for `period` to `workspace/{year}{month}.zip` and
    /// returns that path. The bytes are not inspected.
    async fn fetch(&self, period: Period, workspace: &Path) -> Result<PathBuf>;
}
