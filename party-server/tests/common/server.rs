//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own videos tree and database.

use super::constants::*;
use super::fixtures::{create_test_party, FixturePaths};
use party_server::config::{
    AdminSecret, AdminSettings, PollingSettings, SlideshowSettings, VideoSettings,
};
use party_server::party_store::{PartyStore, SqlitePartyStore};
use party_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use party_server::{PlayCountFile, SlideDeck, VideoRotation};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated party tree
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Party store for direct database access in tests
    pub party_store: Arc<dyn PartyStore>,

    /// Video rotation shared with the running server
    pub video_rotation: Arc<VideoRotation>,

    /// Videos directory, tests may add or remove files before a reload
    pub videos_dir: PathBuf,

    /// Play counts file written by the server
    pub play_counts_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn test_config(port: u16, paths: &FixturePaths) -> ServerConfig {
    ServerConfig {
        requests_logging_level: RequestsLoggingLevel::None,
        port,
        admin: AdminSettings {
            secret: AdminSecret::Plain(ADMIN_PASS.to_string()),
            session_ttl: Duration::from_secs(60 * 60),
        },
        polling: PollingSettings::default(),
        video: VideoSettings::default(),
        slideshow: SlideshowSettings::default(),
        videos_dir: paths.videos_dir.clone(),
        images_dir: paths.images_dir.clone(),
        backgrounds_dir: paths.backgrounds_dir.clone(),
        ui_dir: None,
        slideshow_file: paths.slideshow_file.clone(),
    }
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if fixture creation, port binding or startup fails.
    pub async fn spawn() -> Self {
        let (temp_dir, paths) = create_test_party().expect("Failed to create test party tree");

        let party_store: Arc<dyn PartyStore> = Arc::new(
            SqlitePartyStore::new(paths.data_dir.join("party.db"))
                .expect("Failed to open party store"),
        );

        let play_counts_path = paths.data_dir.join("play_counts.json");
        let video_rotation = Arc::new(VideoRotation::open(
            &paths.videos_dir,
            VideoSettings::default().min_video_bytes,
            PlayCountFile::new(&play_counts_path),
        ));

        let slide_deck = SlideDeck::load(&paths.slideshow_file).expect("Failed to load fixture deck");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = make_app(
            test_config(port, &paths),
            party_store.clone(),
            video_rotation.clone(),
            slide_deck,
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            party_store,
            video_rotation,
            videos_dir: paths.videos_dir.clone(),
            play_counts_path,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/api/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
