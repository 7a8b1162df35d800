//! Tests for artifact download and validation
//!
//! Tests cover:
//! - Byte-exact downloads with and without a published checksum
//! - Checksum mismatch and truncated transfers as CorruptDownload
//! - HTTP errors as DownloadFailed
//! - Cleanup of temporary files on every failure path

mod common;

use common::*;
use guizhan_update::download::{sweep_partials, PARTIAL_SUFFIX};
use guizhan_update::{ArtifactDownloader, BuildInfo, BuildVersion, ErrorKind};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::MockServer;

fn downloader() -> ArtifactDownloader {
    ArtifactDownloader::new(reqwest::Client::new(), Duration::from_secs(10))
}

fn build_info(url: String, checksum: Option<String>) -> BuildInfo {
    BuildInfo {
        version: BuildVersion::from(BUILD_13),
        download_url: url,
        checksum,
    }
}

/// Files in `dir` whose names end with the partial-download suffix
fn partial_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.ends_with(PARTIAL_SUFFIX))
        .collect()
}

#[tokio::test]
async fn test_download_matches_served_bytes() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();

    let build = build_info(
        format!("{}{}", server.uri(), ARTIFACT_PATH),
        Some(sha256_hex(NEW_CONTENT)),
    );
    let download = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap();

    assert_eq!(download.size(), NEW_CONTENT.len() as u64);
    assert_eq!(download.checksum(), sha256_hex(NEW_CONTENT));
    assert_eq!(fs::read(download.path()).unwrap(), NEW_CONTENT);
    assert_eq!(download.path().parent().unwrap(), temp.path());
}

#[tokio::test]
async fn test_download_without_published_checksum() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();

    let build = build_info(format!("{}{}", server.uri(), ARTIFACT_PATH), None);
    let download = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap();

    assert_eq!(fs::read(download.path()).unwrap(), NEW_CONTENT);
}

#[tokio::test]
async fn test_download_accepts_uppercase_checksum() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();

    let build = build_info(
        format!("{}{}", server.uri(), ARTIFACT_PATH),
        Some(sha256_hex(NEW_CONTENT).to_uppercase()),
    );

    assert!(downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_checksum_mismatch_is_corrupt_download() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();

    let build = build_info(
        format!("{}{}", server.uri(), ARTIFACT_PATH),
        Some(WRONG_CHECKSUM.to_string()),
    );
    let err = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptDownload);
    assert!(err.detail().contains("Checksum mismatch"));
    assert!(partial_files(temp.path()).is_empty());
}

#[tokio::test]
async fn test_http_error_is_download_failed() {
    let server = MockServer::start().await;
    mock_artifact_status(&server, 404).await;
    let temp = TempDir::new().unwrap();

    let build = build_info(format!("{}{}", server.uri(), ARTIFACT_PATH), None);
    let err = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
    assert!(err.detail().contains("404"));
    assert!(partial_files(temp.path()).is_empty());
}

/// Serve one response that declares 100 bytes but sends 10, then hang up
async fn serve_truncated_once() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n")
            .await;
        let _ = socket.write_all(&[0x42; 10]).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{}/GuizhanLibPlugin.jar", addr)
}

#[tokio::test]
async fn test_truncated_transfer_is_corrupt_download() {
    let url = serve_truncated_once().await;
    let temp = TempDir::new().unwrap();
    let target = temp.path().join(ARTIFACT_NAME);
    fs::write(&target, OLD_CONTENT).unwrap();

    let err = downloader()
        .download(&build_info(url, None), temp.path(), ARTIFACT_NAME)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptDownload);
    assert!(partial_files(temp.path()).is_empty());
    assert_eq!(fs::read(&target).unwrap(), OLD_CONTENT);
}

#[tokio::test]
async fn test_dropped_download_leaves_target_untouched() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();
    let target = temp.path().join(ARTIFACT_NAME);
    fs::write(&target, OLD_CONTENT).unwrap();

    let build = build_info(format!("{}{}", server.uri(), ARTIFACT_PATH), None);
    let download = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap();
    let temp_path = download.path().to_path_buf();
    drop(download);

    assert!(!temp_path.exists());
    assert_eq!(fs::read(&target).unwrap(), OLD_CONTENT);
}

#[tokio::test]
async fn test_download_sweeps_stale_partials() {
    let server = MockServer::start().await;
    mock_artifact(&server, NEW_CONTENT).await;
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join(format!(".{}.abc123{}", ARTIFACT_NAME, PARTIAL_SUFFIX));
    fs::write(&stale, b"leftover").unwrap();

    let build = build_info(format!("{}{}", server.uri(), ARTIFACT_PATH), None);
    let download = downloader()
        .download(&build, temp.path(), ARTIFACT_NAME)
        .await
        .unwrap();

    assert!(!stale.exists());
    assert_eq!(partial_files(temp.path()).len(), 1);
    drop(download);
    assert_eq!(sweep_partials(temp.path(), ARTIFACT_NAME), 0);
}
