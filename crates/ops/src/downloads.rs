//! Manifest download orchestration

use crate::{DownloadReport, FileReport, OpsCtx};
use liftoff_config::{DownloadFile, DownloadsConfig};
use liftoff_errors::Error;
use liftoff_events::EventEmitter;
use liftoff_net::DownloadRequest;
use std::time::Instant;
use tracing::info;

/// Build the acquisition request for one manifest entry
#[must_use]
pub fn request_for(file: &DownloadFile) -> DownloadRequest {
    let mut request = DownloadRequest::new(&file.url, &file.dest);
    if let Some(sha256) = file.sha256.as_deref().filter(|s| !s.trim().is_empty()) {
        request = request.with_sha256(sha256);
    }
    if let Some(rename) = file.rename.as_deref().filter(|s| !s.is_empty()) {
        request = request.with_rename(rename);
    }
    request
}

/// Acquire every file in the manifest, one at a time
///
/// # Errors
///
/// Returns the first failure; files after it are not attempted.
pub async fn download_all(ctx: &OpsCtx, downloads: &DownloadsConfig) -> Result<DownloadReport, Error> {
    let start = Instant::now();
    let mut report = DownloadReport::default();

    if downloads.files.is_empty() {
        info!("no downloads configured");
        return Ok(report);
    }

    ctx.emit_operation_started("download");
    for file in &downloads.files {
        let request = request_for(file);
        match ctx.downloader.download(&request).await {
            Ok(result) => {
                report.total_bytes += result.size;
                report.files.push(FileReport::new(&file.url, &result));
            }
            Err(e) => {
                ctx.emit_operation_completed("download", false);
                return Err(e);
            }
        }
    }

    report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        files = report.files.len(),
        total_bytes = report.total_bytes,
        "downloads complete"
    );
    ctx.emit_operation_completed("download", true);
    Ok(report)
}

/// Acquire a single ad-hoc request
///
/// # Errors
///
/// Returns the acquisition error unchanged.
pub async fn fetch(ctx: &OpsCtx, request: &DownloadRequest) -> Result<FileReport, Error> {
    let result = ctx.downloader.download(request).await?;
    Ok(FileReport::new(&request.url, &result))
}
