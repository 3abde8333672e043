//! Download and install docsets from the published feeds.
//!
//! Listing → user picks a subset → for each pick, sequentially: stream the
//! `.tgz` archive to disk, unpack it next to the archive, delete the archive.
//! A failed docset is logged and counted; the batch carries on.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use docmux_discovery::DiscoveryOptions;
use docmux_shared::{DocmuxError, FeedsConfig, Result};
use futures::StreamExt;
use reqwest::Client;
use tracing::{error, info, instrument, warn};

use crate::resolve::{SelectMode, SelectOutcome, SelectRequest, Selector};

/// User-Agent string for archive downloads.
const USER_AGENT: &str = concat!("docmux/", env!("CARGO_PKG_VERSION"));

/// Prompt shown while picking docsets.
const DOWNLOAD_PROMPT: &str = "Select docsets to download: ";

/// Progress callback for the acquisition pipeline.
pub trait ProgressReporter {
    /// A docset download is starting. `total_bytes` is known only when the
    /// server sends a content length.
    fn download_started(&self, name: &str, total_bytes: Option<u64>);
    /// More bytes of the current archive have arrived.
    fn download_progress(&self, downloaded: u64);
    /// The archive is fully on disk and is being unpacked.
    fn extracting(&self, name: &str);
    /// The current docset finished, successfully or not.
    fn finished(&self, name: &str, ok: bool);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn download_started(&self, _name: &str, _total_bytes: Option<u64>) {}
    fn download_progress(&self, _downloaded: u64) {}
    fn extracting(&self, _name: &str) {}
    fn finished(&self, _name: &str, _ok: bool) {}
}

/// Outcome of an install batch.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl InstallReport {
    pub fn attempted(&self) -> usize {
        self.installed.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What the interactive acquisition flow ended with.
#[derive(Debug)]
pub enum AcquireOutcome {
    /// The user picked nothing or aborted the selector.
    NothingSelected,
    /// At least one docset was attempted.
    Installed(InstallReport),
}

/// Downloads archives and unpacks them into a target directory.
#[derive(Debug, Clone)]
pub struct Installer {
    client: Client,
    base_url: String,
    target_dir: PathBuf,
}

impl Installer {
    pub fn new(config: &FeedsConfig, target_dir: &Path) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DocmuxError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.download_base_url.trim_end_matches('/').to_string(),
            target_dir: target_dir.to_path_buf(),
        })
    }

    /// Install each docset in order. Never fails as a whole.
    pub async fn install_all(&self, names: &[String], progress: &dyn ProgressReporter) -> InstallReport {
        let mut report = InstallReport::default();

        for name in names {
            match self.install(name, progress).await {
                Ok(()) => {
                    info!(docset = %name, "successfully installed");
                    progress.finished(name, true);
                    report.installed.push(name.clone());
                }
                Err(e) => {
                    error!(docset = %name, error = %e, "failed to install");
                    progress.finished(name, false);
                    report.failed.push((name.clone(), e.to_string()));
                }
            }
        }

        info!(
            installed = report.installed.len(),
            selected = report.attempted(),
            "download batch finished"
        );
        report
    }

    /// Download, unpack and clean up one docset.
    #[instrument(skip(self, progress))]
    pub async fn install(&self, name: &str, progress: &dyn ProgressReporter) -> Result<()> {
        let archive = self.target_dir.join(format!("{name}.tgz"));

        let result = self.fetch_and_unpack(name, &archive, progress).await;

        if archive.exists() {
            if let Err(e) = std::fs::remove_file(&archive) {
                let cleanup = DocmuxError::io(&archive, e);
                warn!(docset = %name, error = %cleanup, "failed to remove archive");
                return result.and(Err(cleanup));
            }
        }
        result
    }

    async fn fetch_and_unpack(
        &self,
        name: &str,
        archive: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        self.download(name, archive, progress).await?;
        info!(docset = %name, "extracting");
        progress.extracting(name);
        extract_archive(archive, &self.target_dir)
    }

    /// Stream `<base_url>/<name>.tgz` into `archive`.
    async fn download(&self, name: &str, archive: &Path, progress: &dyn ProgressReporter) -> Result<u64> {
        let url = format!("{}/{name}.tgz", self.base_url);
        info!(%url, "downloading");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DocmuxError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocmuxError::Network(format!("{url}: HTTP {status}")));
        }

        let total_bytes = response.content_length().filter(|&n| n > 0);
        progress.download_started(name, total_bytes);

        let mut file = File::create(archive).map_err(|e| DocmuxError::io(archive, e))?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DocmuxError::Network(format!("{url}: {e}")))?;
            file.write_all(&chunk).map_err(|e| DocmuxError::io(archive, e))?;
            downloaded += chunk.len() as u64;
            progress.download_progress(downloaded);
        }

        file.flush().map_err(|e| DocmuxError::io(archive, e))?;
        Ok(downloaded)
    }
}

/// Unpack a gzip-compressed tar archive into `dest_dir`.
pub fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| DocmuxError::io(archive, e))?;
    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    let mut tarball = tar::Archive::new(decoder);

    tarball
        .unpack(dest_dir)
        .map_err(|e| DocmuxError::Archive(format!("{}: {e}", archive.display())))
}

/// The full interactive download flow into `target_dir`.
pub async fn acquire(
    config: &FeedsConfig,
    target_dir: &Path,
    selector: &dyn Selector,
    progress: &dyn ProgressReporter,
) -> Result<AcquireOutcome> {
    if !target_dir.is_dir() {
        return Err(DocmuxError::validation(format!(
            "not a directory: {}",
            target_dir.display()
        )));
    }

    info!("fetching available docsets");
    let available = docmux_discovery::fetch_available_docsets(&DiscoveryOptions::from(config)).await?;
    if available.is_empty() {
        return Err(DocmuxError::validation("no docsets found in feed listing"));
    }
    info!(count = available.len(), "found docsets");

    let request = SelectRequest {
        lines: &available,
        mode: SelectMode::Many,
        prompt: Some(DOWNLOAD_PROMPT),
    };
    let selected = match selector.select(&request)? {
        SelectOutcome::Accepted(lines) if !lines.is_empty() => lines,
        _ => {
            info!("no docsets selected");
            return Ok(AcquireOutcome::NothingSelected);
        }
    };

    let installer = Installer::new(config, target_dir)?;
    Ok(AcquireOutcome::Installed(installer.install_all(&selected, progress).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    /// A `.tgz` holding `<name>.docset/Contents/Info.plist`.
    fn docset_tarball(name: &str) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
        let body = b"<plist/>";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{name}.docset/Contents/Info.plist"), &body[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn feeds_for(server: &wiremock::MockServer) -> FeedsConfig {
        FeedsConfig {
            index_url: format!("{}/tree", server.uri()),
            download_base_url: format!("{}/feeds/", server.uri()),
            timeout_secs: 5,
        }
    }

    struct PickAll;

    impl Selector for PickAll {
        fn select(&self, request: &SelectRequest<'_>) -> Result<SelectOutcome> {
            assert_eq!(request.mode, SelectMode::Many);
            Ok(SelectOutcome::Accepted(request.lines.to_vec()))
        }
    }

    struct Abort;

    impl Selector for Abort {
        fn select(&self, _request: &SelectRequest<'_>) -> Result<SelectOutcome> {
            Ok(SelectOutcome::Cancelled)
        }
    }

    #[test]
    fn extract_unpacks_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("Go.tgz");
        std::fs::write(&archive, docset_tarball("Go")).unwrap();

        extract_archive(&archive, dir.path()).unwrap();
        assert!(dir.path().join("Go.docset/Contents/Info.plist").is_file());
    }

    #[test]
    fn extract_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("Bad.tgz");
        std::fs::write(&archive, b"not gzip at all").unwrap();

        assert!(matches!(
            extract_archive(&archive, dir.path()),
            Err(DocmuxError::Archive(_))
        ));
    }

    #[tokio::test]
    async fn install_downloads_extracts_and_cleans_up() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Go.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(docset_tarball("Go")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new(&feeds_for(&server), dir.path()).unwrap();
        installer.install("Go", &SilentProgress).await.unwrap();

        assert!(dir.path().join("Go.docset/Contents/Info.plist").is_file());
        assert!(!dir.path().join("Go.tgz").exists());
    }

    #[tokio::test]
    async fn failed_download_is_counted_and_batch_continues() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Missing.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Go.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(docset_tarball("Go")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new(&feeds_for(&server), dir.path()).unwrap();
        let report = installer
            .install_all(&["Missing".into(), "Go".into()], &SilentProgress)
            .await;

        assert_eq!(report.installed, vec!["Go"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Missing");
        assert!(!report.all_succeeded());
        assert!(!dir.path().join("Missing.tgz").exists());
    }

    #[tokio::test]
    async fn corrupt_archive_is_removed() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Bad.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(b"truncated".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::new(&feeds_for(&server), dir.path()).unwrap();
        let err = installer.install("Bad", &SilentProgress).await.unwrap_err();

        assert!(matches!(err, DocmuxError::Archive(_)));
        assert!(!dir.path().join("Bad.tgz").exists());
    }

    #[tokio::test]
    async fn cleanup_failure_keeps_the_original_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Blocked.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // A directory where the archive should go cannot be removed as a file.
        std::fs::create_dir(dir.path().join("Blocked.tgz")).unwrap();

        let installer = Installer::new(&feeds_for(&server), dir.path()).unwrap();
        let err = installer.install("Blocked", &SilentProgress).await.unwrap_err();

        assert!(matches!(err, DocmuxError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn acquire_end_to_end() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/tree"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"{"tree":[{"path":"Go.xml","type":"blob"}]}"#),
            )
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/feeds/Go.tgz"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(docset_tarball("Go")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let outcome = acquire(&feeds_for(&server), dir.path(), &PickAll, &SilentProgress)
            .await
            .unwrap();

        match outcome {
            AcquireOutcome::Installed(report) => {
                assert_eq!(report.installed, vec!["Go"]);
                assert!(report.all_succeeded());
            }
            AcquireOutcome::NothingSelected => panic!("expected an install"),
        }
        assert!(dir.path().join("Go.docset").is_dir());
    }

    #[tokio::test]
    async fn acquire_cancelled_selection_installs_nothing() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/tree"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"{"tree":[{"path":"Go.xml","type":"blob"}]}"#),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let outcome = acquire(&feeds_for(&server), dir.path(), &Abort, &SilentProgress)
            .await
            .unwrap();
        assert!(matches!(outcome, AcquireOutcome::NothingSelected));
    }

    #[tokio::test]
    async fn acquire_rejects_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = acquire(&FeedsConfig::default(), &missing, &Abort, &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
