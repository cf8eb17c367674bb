// src/fetch/zips.rs

use futures_util::StreamExt;
use reqwest::{header::CONTENT_TYPE, Client};
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, info, instrument};
use url::Url;

use super::{query, Source};
use crate::{
    error::{IngestError, Result},
    period::Period,
};

/// Downloads monthly extracts from the BTS download form.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

impl Source for HttpSource {
    #[instrument(level = "info", skip(self, period, workspace), fields(period = %period))]
    async fn fetch(&self, period: Period, workspace: &Path) -> Result<PathBuf> {
        info!("requesting data for {} {:02}", period.year(), period.month());
        let dest = workspace.join(period.archive_file_name());
        let transport = |source: reqwest::Error| IngestError::Transport { period, source };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(query::form_body(period))
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;

        let mut file = File::create(&dest)
            .await
            .map_err(|e| IngestError::io(format!("creating {}", dest.display()), e))?;

        let mut stream = resp.bytes_stream();
        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| IngestError::io(format!("writing {}", dest.display()), e))?;
            total += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| IngestError::io(format!("flushing {}", dest.display()), e))?;

        debug!(bytes = total, "download complete");
        info!("{} saved", dest.display());
        Ok(dest)
    }
}
