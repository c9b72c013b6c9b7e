//! End-to-end detection scenarios against a scripted connector.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use unseeded_config::{BackendKind, RawPathMapping, ServiceConfig};
use unseeded_core::{
    BackendError, BackendResult, CancelFlag, Connector, ScanSettings, ScanStatus, TorrentClient,
    TorrentRecord, scan_global, scan_service,
};

struct ScriptedClient(Vec<TorrentRecord>);

#[async_trait]
impl TorrentClient for ScriptedClient {
    async fn list_torrents(&self) -> BackendResult<Vec<TorrentRecord>> {
        Ok(self.0.clone())
    }
}

/// Services missing from the script refuse to connect.
#[derive(Default)]
struct ScriptedConnector {
    torrents: HashMap<String, Vec<TorrentRecord>>,
}

impl ScriptedConnector {
    fn with(mut self, service: &str, records: Vec<TorrentRecord>) -> Self {
        self.torrents.insert(service.to_string(), records);
        self
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, service: &ServiceConfig) -> BackendResult<Box<dyn TorrentClient>> {
        match self.torrents.get(&service.name) {
            Some(records) => Ok(Box::new(ScriptedClient(records.clone()))),
            None => Err(BackendError::AuthenticationRejected {
                operation: "auth.login",
            }),
        }
    }
}

fn service(name: &str) -> ServiceConfig {
    ServiceConfig::new(name, BackendKind::Qbittorrent, "localhost", 8080)
}

fn write_file(path: &Path, size: usize) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, vec![0_u8; size])?;
    Ok(())
}

/// Sparse file of `len` bytes; only metadata is written.
fn write_sparse(path: &Path, len: u64) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?.set_len(len)?;
    Ok(())
}

fn text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn sorted_paths(files: &[unseeded_core::UnseededFile]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = files.iter().map(|file| file.path.clone()).collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn global_scan_reports_only_unseeded_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let downloads = dir.path().join("downloads");
    write_file(&downloads.join("Movie.mkv"), 64)?;
    write_file(&downloads.join("Show1/e01.mkv"), 64)?;
    write_file(&downloads.join("Show10/e01.mkv"), 64)?;
    write_file(&downloads.join("orphan.iso"), 64)?;
    write_file(&downloads.join("tiny.nfo"), 4)?;

    let connector = ScriptedConnector::default()
        .with("qb", vec![TorrentRecord::new("Movie.mkv", "/downloads")])
        .with("tr", vec![TorrentRecord::new("Show1", "/downloads")]);
    let mut qb = service("qb");
    qb.path_mapping = vec![RawPathMapping::explicit("/downloads", text(&downloads))];
    let mut tr = service("tr");
    tr.path_mapping = vec![RawPathMapping::shorthand(text(&downloads), "/downloads")];

    let settings = ScanSettings {
        min_size_bytes: 16,
        excluded_paths: Vec::new(),
    };
    let result = scan_global(
        &connector,
        &[qb, tr],
        &[text(&downloads)],
        &settings,
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::Completed);
    assert!(result.errors.is_empty());
    assert_eq!(
        sorted_paths(&result.files),
        vec![downloads.join("Show10/e01.mkv"), downloads.join("orphan.iso")]
    );
    assert_eq!(result.total_bytes(), 128);
    Ok(())
}

#[tokio::test]
async fn global_scan_refuses_to_run_without_seeded_content() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(&dir.path().join("orphan.iso"), 64)?;

    let connector = ScriptedConnector::default().with("empty", Vec::new());
    let result = scan_global(
        &connector,
        &[service("empty"), service("offline")],
        &[text(dir.path())],
        &ScanSettings::default(),
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::NoSeededData);
    assert!(result.files.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("offline"));
    Ok(())
}

#[tokio::test]
async fn global_scan_continues_when_one_backend_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(&dir.path().join("kept/a.bin"), 8)?;
    write_file(&dir.path().join("stray.bin"), 8)?;

    let connector =
        ScriptedConnector::default().with("qb", vec![TorrentRecord::new("kept", text(dir.path()))]);
    let result = scan_global(
        &connector,
        &[service("qb"), service("offline")],
        &[text(dir.path())],
        &ScanSettings::default(),
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(sorted_paths(&result.files), vec![dir.path().join("stray.bin")]);
    Ok(())
}

#[tokio::test]
async fn service_scan_walks_translated_save_directories() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let movies = dir.path().join("movies");
    write_file(&movies.join("Seeded.mkv"), 32)?;
    write_file(&movies.join("Leftover.mkv"), 32)?;
    write_file(&dir.path().join("elsewhere/ignored.mkv"), 32)?;

    let connector = ScriptedConnector::default()
        .with("qb", vec![TorrentRecord::new("Seeded.mkv", "/data/movies")]);
    let mut qb = service("qb");
    qb.path_mapping = vec![RawPathMapping::explicit("/data", text(dir.path()))];

    let result = scan_service(&connector, &qb, &ScanSettings::default(), &CancelFlag::new()).await;

    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(sorted_paths(&result.files), vec![movies.join("Leftover.mkv")]);
    Ok(())
}

#[tokio::test]
async fn service_scan_without_torrents_is_skipped() {
    let connector = ScriptedConnector::default().with("qb", Vec::new());
    let result = scan_service(
        &connector,
        &service("qb"),
        &ScanSettings::default(),
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::NoTorrents);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn service_scan_reports_connection_failures() {
    let result = scan_service(
        &ScriptedConnector::default(),
        &service("offline"),
        &ScanSettings::default(),
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::BackendUnavailable);
    assert_eq!(
        result.errors,
        vec!["unable to connect to offline: backend rejected credentials (auth.login)".to_string()]
    );
}

#[tokio::test]
async fn every_backend_failing_leaves_the_scanner_idle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(&dir.path().join("orphan.iso"), 64)?;

    let result = scan_global(
        &ScriptedConnector::default(),
        &[service("qb-a"), service("qb-b"), service("tr")],
        &[text(dir.path())],
        &ScanSettings::default(),
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::NoSeededData);
    assert!(result.files.is_empty());
    assert_eq!(result.errors.len(), 3);
    for name in ["qb-a", "qb-b", "tr"] {
        assert!(
            result.errors.iter().any(|error| error.contains(&format!("connect to {name}:"))),
            "missing error for {name}: {:?}",
            result.errors
        );
    }
    Ok(())
}

#[tokio::test]
async fn large_uncovered_file_is_reported_beside_seeded_content() -> anyhow::Result<()> {
    const MB: u64 = 1024 * 1024;
    let dir = tempfile::tempdir()?;
    let downloads = dir.path().join("downloads");
    write_sparse(&downloads.join("A/f1.bin"), 500 * MB)?;
    write_sparse(&downloads.join("B/f2.bin"), 500 * MB)?;

    let connector =
        ScriptedConnector::default().with("qb", vec![TorrentRecord::new("A", "/downloads")]);
    let mut qb = service("qb");
    qb.path_mapping = vec![RawPathMapping::explicit("/downloads", text(&downloads))];
    let settings = ScanSettings {
        min_size_bytes: 100 * MB,
        excluded_paths: Vec::new(),
    };

    let result = scan_global(
        &connector,
        &[qb],
        &[text(&downloads)],
        &settings,
        &CancelFlag::new(),
    )
    .await;

    assert_eq!(result.status, ScanStatus::Completed);
    assert_eq!(sorted_paths(&result.files), vec![downloads.join("B/f2.bin")]);
    assert_eq!(result.total_bytes(), 500 * MB);
    Ok(())
}
