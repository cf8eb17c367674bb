// src/pipeline.rs

use std::path::Path;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

use crate::{
    config::IngestConfig,
    error::{IngestError, Result},
    fetch::Source,
    period::Period,
    process::{clean_csv, unzip_file, verify_ingest},
    publish::{upload_to_cloud, BlobStore},
    schema,
};

/// How a single period ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodOutcome {
    /// Cleaned file uploaded; carries its address.
    Published(String),
    /// Nothing to publish yet (header-only extract).
    Skipped { period: Period, reason: String },
}

/// Drives download → extract → clean → verify → upload for each period.
pub struct Ingestor<S, B> {
    source: S,
    store: B,
    config: IngestConfig,
}

impl<S: Source, B: BlobStore> Ingestor<S, B> {
    pub fn new(source: S, store: B, config: IngestConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    /// Ingest every month of every year in `years`.
    pub async fn run<I>(&self, years: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = i32>,
    {
        self.run_periods(&Period::enumerate(years)).await
    }

    /// Ingest `periods` in order. Returns one location per published period;
    /// the first fatal error stops the batch.
    pub async fn run_periods(&self, periods: &[Period]) -> Result<Vec<String>> {
        self.config.validate()?;

        let total = periods.len();
        let mut locations = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for (i, &period) in periods.iter().enumerate() {
            info!("period {}/{}: ingesting data for {}", i + 1, total, period);
            match self.ingest_period(period).await? {
                PeriodOutcome::Published(location) => {
                    info!("complete, uploaded to {}", location);
                    locations.push(location);
                }
                PeriodOutcome::Skipped { period, reason } => {
                    info!(%period, "try again later: {}", reason);
                    skipped += 1;
                }
            }
        }

        info!(published = locations.len(), skipped, "batch finished");
        Ok(locations)
    }

    /// Run one period inside its own workspace. The workspace is removed on
    /// every exit path: success, skip, error, or the future being dropped.
    #[instrument(level = "info", skip(self, period), fields(period = %period))]
    pub async fn ingest_period(&self, period: Period) -> Result<PeriodOutcome> {
        let workspace = tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .tempdir_in(&self.config.work_root)
            .map_err(|e| {
                IngestError::io(
                    format!("creating workspace in {}", self.config.work_root.display()),
                    e,
                )
            })?;

        let outcome = self.run_stages(period, workspace.path()).await;
        cleanup(workspace);
        outcome
    }

    async fn run_stages(&self, period: Period, workspace: &Path) -> Result<PeriodOutcome> {
        let zip_file = self.source.fetch(period, workspace).await?;
        let csv_file = unzip_file(&zip_file, workspace)?;
        let cleaned = clean_csv(&csv_file, period, self.config.remove_original)?;

        match verify_ingest(&cleaned, &schema::expected_header()) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                return Ok(PeriodOutcome::Skipped {
                    period,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        let key = self.config.object_key(&period.cleaned_file_name());
        let location = upload_to_cloud(&self.store, &cleaned, &self.config.bucket, &key).await?;
        Ok(PeriodOutcome::Published(location))
    }
}

fn cleanup(workspace: TempDir) {
    info!("cleaning up {}", workspace.path().display());
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        warn!(workspace = %path.display(), error = %e, "could not remove workspace");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::test_support::{init_test_logging, zip_bytes};
    use crate::publish::DirStore;
    use std::{
        collections::HashMap,
        path::PathBuf,
        sync::Mutex,
    };
    use tempfile::tempdir;

    /// Serves canned archive bytes per period and remembers the workspaces
    /// it was handed.
    #[derive(Default)]
    struct CannedSource {
        archives: HashMap<Period, Vec<u8>>,
        fallback: Option<Vec<u8>>,
        seen: Mutex<Vec<PathBuf>>,
    }

    impl CannedSource {
        fn with(mut self, period: Period, bytes: Vec<u8>) -> Self {
            self.archives.insert(period, bytes);
            self
        }

        fn otherwise(mut self, bytes: Vec<u8>) -> Self {
            self.fallback = Some(bytes);
            self
        }

        fn workspaces(&self) -> Vec<PathBuf> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Source for CannedSource {
        async fn fetch(&self, period: Period, workspace: &Path) -> Result<PathBuf> {
            self.seen.lock().unwrap().push(workspace.to_path_buf());
            let bytes = self
                .archives
                .get(&period)
                .or(self.fallback.as_ref())
                .ok_or_else(|| {
                    IngestError::io(
                        format!("no archive for {}", period),
                        std::io::Error::new(std::io::ErrorKind::NotFound, "unreachable"),
                    )
                })?;
            let dest = workspace.join(period.archive_file_name());
            std::fs::write(&dest, bytes)
                .map_err(|e| IngestError::io(format!("writing {}", dest.display()), e))?;
            Ok(dest)
        }
    }

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn extract_with_rows(rows: &[&str]) -> Vec<u8> {
        let mut csv = schema::COLUMNS
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(",\r\n");
        for row in rows {
            csv.push_str(row);
            csv.push_str(",\r\n");
        }
        zip_bytes(&[("On_Time_On_Time_Performance.csv", csv.as_bytes())])
    }

    fn good_extract() -> Vec<u8> {
        extract_with_rows(&[
            "\"2020-03-01\",\"AA\",19805,\"AA\",\"1\",12478,1247805,31703,\"JFK\",12892,1289208,32575,\"LAX\",\"0900\",\"0905\",5.00,20.00,\"0925\",\"1210\",8.00,\"1230\",\"1218\",-12.00,0.00,\"\",0.00,2475.00",
            "\"2020-03-02\",\"DL\",19790,\"DL\",\"2\",10397,1039707,30397,\"ATL\",13930,1393007,30977,\"ORD\",\"0700\",\"0655\",-5.00,15.00,\"0710\",\"0805\",6.00,\"0820\",\"0811\",-9.00,0.00,\"\",0.00,606.00",
        ])
    }

    fn header_only_extract() -> Vec<u8> {
        extract_with_rows(&[])
    }

    fn missing_column_extract() -> Vec<u8> {
        let header = schema::COLUMNS
            .iter()
            .filter(|c| c.name != "TAXI_IN")
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(",");
        let csv = format!("{}\n2020-03-01,AA\n", header);
        zip_bytes(&[("On_Time_On_Time_Performance.csv", csv.as_bytes())])
    }

    struct Harness {
        _root: TempDir,
        work_root: PathBuf,
        store_root: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            init_test_logging();
            let root = tempdir().unwrap();
            let work_root = root.path().join("work");
            let store_root = root.path().join("store");
            std::fs::create_dir_all(&work_root).unwrap();
            Self {
                _root: root,
                work_root,
                store_root,
            }
        }

        fn ingestor(&self, source: CannedSource) -> Ingestor<CannedSource, DirStore> {
            let config = IngestConfig::new("landing").with_work_root(&self.work_root);
            Ingestor::new(source, DirStore::new(&self.store_root), config)
        }

        fn leftover_workspaces(&self) -> usize {
            std::fs::read_dir(&self.work_root).unwrap().count()
        }
    }

    #[tokio::test]
    async fn single_period_publishes_cleaned_file() {
        let h = Harness::new();
        let period = p(2020, 3);
        let ingestor = h.ingestor(CannedSource::default().with(period, good_extract()));

        let locations = ingestor.run_periods(&[period]).await.unwrap();

        assert_eq!(locations, vec!["file://landing/flights/raw/03-2020.csv".to_string()]);
        assert!(locations[0].ends_with("/flights/raw/03-2020.csv"));

        let published =
            std::fs::read_to_string(h.store_root.join("landing/flights/raw/03-2020.csv")).unwrap();
        let mut lines = published.lines();
        assert_eq!(lines.next(), Some(schema::expected_header().as_str()));
        assert_eq!(lines.clone().count(), 2);
        assert!(lines.all(|l| !l.contains('"') && !l.ends_with(',')));

        let workspaces = ingestor.source.workspaces();
        assert_eq!(workspaces.len(), 1);
        assert!(!workspaces[0].exists());
        assert_eq!(h.leftover_workspaces(), 0);
    }

    #[tokio::test]
    async fn missing_column_is_fatal_and_workspace_removed() {
        let h = Harness::new();
        let period = p(2020, 3);
        let ingestor = h.ingestor(CannedSource::default().with(period, missing_column_extract()));

        let err = ingestor.run_periods(&[period]).await.unwrap_err();

        match &err {
            IngestError::FormatMismatch { path, observed, .. } => {
                assert!(path.ends_with("03-2020.csv"));
                assert!(!observed.contains("TAXI_IN"));
            }
            other => panic!("expected FormatMismatch, got {:?}", other),
        }
        assert!(!h.store_root.join("landing/flights/raw/03-2020.csv").exists());
        assert!(ingestor.source.workspaces().iter().all(|w| !w.exists()));
        assert_eq!(h.leftover_workspaces(), 0);
    }

    #[tokio::test]
    async fn header_only_period_is_skipped_and_batch_continues() {
        let h = Harness::new();
        let source = CannedSource::default()
            .with(p(2020, 2), header_only_extract())
            .otherwise(good_extract());
        let ingestor = h.ingestor(source);

        let locations = ingestor.run(2020..=2020).await.unwrap();

        assert_eq!(locations.len(), 11);
        assert!(!locations.iter().any(|l| l.ends_with("/02-2020.csv")));
        assert!(locations[0].ends_with("/01-2020.csv"));
        assert!(locations[1].ends_with("/03-2020.csv"));
        assert!(locations[10].ends_with("/12-2020.csv"));
        assert_eq!(h.leftover_workspaces(), 0);
    }

    #[tokio::test]
    async fn every_period_gets_a_fresh_workspace() {
        let h = Harness::new();
        let ingestor = h.ingestor(CannedSource::default().otherwise(good_extract()));

        let locations = ingestor.run(2019..=2020).await.unwrap();

        assert_eq!(locations.len(), 24);
        let expected: Vec<String> = Period::enumerate(2019..=2020)
            .iter()
            .map(|p| format!("file://landing/flights/raw/{}", p.cleaned_file_name()))
            .collect();
        assert_eq!(locations, expected);

        let workspaces = ingestor.source.workspaces();
        assert_eq!(workspaces.len(), 24);
        let distinct: std::collections::HashSet<_> = workspaces.iter().collect();
        assert_eq!(distinct.len(), 24);
        assert!(workspaces.iter().all(|w| !w.exists()));
    }

    #[tokio::test]
    async fn fatal_error_stops_remaining_periods() {
        let h = Harness::new();
        let source = CannedSource::default()
            .with(p(2020, 1), good_extract())
            .with(p(2020, 2), b"<html>maintenance</html>".to_vec())
            .otherwise(good_extract());
        let ingestor = h.ingestor(source);

        let err = ingestor.run(2020..=2020).await.unwrap_err();

        assert!(matches!(err, IngestError::Archive { .. }));
        // January made it out before February failed; nothing after February ran
        assert!(h.store_root.join("landing/flights/raw/01-2020.csv").exists());
        assert!(!h.store_root.join("landing/flights/raw/03-2020.csv").exists());
        assert_eq!(ingestor.source.workspaces().len(), 2);
        assert_eq!(h.leftover_workspaces(), 0);
    }

    #[tokio::test]
    async fn fetch_failure_still_cleans_up() {
        let h = Harness::new();
        let ingestor = h.ingestor(CannedSource::default());

        let err = ingestor.ingest_period(p(2021, 5)).await.unwrap_err();

        assert!(matches!(err, IngestError::Io { .. }));
        assert_eq!(h.leftover_workspaces(), 0);
    }

    /// Publishes into a `DirStore` and, at upload time, records the files
    /// sitting in the one live workspace under `work_root`.
    struct ListingStore {
        inner: DirStore,
        work_root: PathBuf,
        listings: Mutex<Vec<Vec<String>>>,
    }

    impl BlobStore for ListingStore {
        fn scheme(&self) -> &str {
            self.inner.scheme()
        }

        async fn put(
            &self,
            bucket: &str,
            key: &str,
            body: tokio::fs::File,
            len: u64,
        ) -> std::result::Result<(), crate::error::StoreError> {
            for ws in std::fs::read_dir(&self.work_root)? {
                let mut names: Vec<String> = std::fs::read_dir(ws?.path())?
                    .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
                    .collect::<std::io::Result<_>>()?;
                names.sort();
                self.listings.lock().unwrap().push(names);
            }
            self.inner.put(bucket, key, body, len).await
        }
    }

    #[tokio::test]
    async fn original_kept_or_removed_as_configured() {
        for remove_original in [true, false] {
            let h = Harness::new();
            let period = p(2020, 3);
            let source = CannedSource::default().with(period, good_extract());
            let store = ListingStore {
                inner: DirStore::new(&h.store_root),
                work_root: h.work_root.clone(),
                listings: Mutex::new(Vec::new()),
            };
            let config = IngestConfig::new("landing")
                .with_work_root(&h.work_root)
                .with_key_prefix("bts/")
                .with_remove_original(remove_original);
            let ingestor = Ingestor::new(source, store, config);

            let locations = ingestor.run_periods(&[period]).await.unwrap();

            assert_eq!(locations, vec!["file://landing/bts/03-2020.csv".to_string()]);
            let listings = ingestor.store.listings.lock().unwrap();
            assert_eq!(listings.len(), 1);
            let mut expected = vec!["03-2020.csv", "202003.zip"];
            if !remove_original {
                expected.push("On_Time_On_Time_Performance.csv");
            }
            assert_eq!(listings[0], expected);
            assert_eq!(h.leftover_workspaces(), 0);
        }
    }

    #[tokio::test]
    async fn invalid_bucket_fails_before_any_fetch() {
        let h = Harness::new();
        let source = CannedSource::default().otherwise(good_extract());
        let config = IngestConfig::new("").with_work_root(&h.work_root);
        let ingestor = Ingestor::new(source, DirStore::new(&h.store_root), config);

        let err = ingestor.run(2020..=2020).await.unwrap_err();

        assert!(matches!(err, IngestError::Config(_)));
        assert!(ingestor.source.workspaces().is_empty());
    }
}
