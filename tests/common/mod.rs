//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, temp storage
//! directories, scripted conversion engines, and a full [`AppContext`]. The
//! `with_server` constructors start Axum on a random port for HTTP-level
//! testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use nf_core::config::Config;
use nf_core::{ArtifactSet, MediaKind, UserId};
use nf_db::pool::{init_memory_pool, DbPool};
use nf_engine::dispatch::artifact_base_name;
use nf_engine::{ConversionEngine, EngineSet, ToolRegistry};
use nf_server::storage::UploadStore;
use nf_server::{build_router, AppContext};

/// What a scripted engine should do when invoked.
#[derive(Clone, Copy)]
pub enum EngineBehavior {
    /// Write the artifact files a real engine would produce.
    Succeed,
    /// Fail with the given stderr text.
    Fail(&'static str),
}

/// Engine double that records invocations and follows a scripted behavior.
pub struct ScriptedEngine {
    kind: MediaKind,
    behavior: EngineBehavior,
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl ScriptedEngine {
    pub fn new(kind: MediaKind, behavior: EngineBehavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ConversionEngine for ScriptedEngine {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn tool_name(&self) -> &str {
        match self.kind {
            MediaKind::Image => "audiveris",
            MediaKind::Audio => "basic-pitch",
        }
    }

    async fn run(&self, input: &Path, output_dir: &Path) -> nf_core::Result<()> {
        self.calls
            .lock()
            .push((input.to_path_buf(), output_dir.to_path_buf()));

        match self.behavior {
            EngineBehavior::Succeed => {
                let name = input.file_name().unwrap().to_string_lossy().to_string();
                let base = artifact_base_name(&name, self.kind);
                for file in ArtifactSet::derive(&base, self.kind).iter() {
                    std::fs::write(output_dir.join(file), b"artifact")?;
                }
                Ok(())
            }
            EngineBehavior::Fail(stderr) => Err(nf_core::Error::engine(self.tool_name(), stderr)),
        }
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and temp storage directories.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub image_engine: Arc<ScriptedEngine>,
    pub audio_engine: Arc<ScriptedEngine>,
    // Held for its Drop; removes the storage directories.
    _dirs: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and engines that
    /// succeed.
    pub fn new() -> Self {
        Self::with_options(
            Config::default(),
            EngineBehavior::Succeed,
            EngineBehavior::Succeed,
        )
    }

    /// Create a harness with custom config (storage dirs are overridden to
    /// temp directories) and scripted engine behaviors.
    pub fn with_options(mut config: Config, image: EngineBehavior, audio: EngineBehavior) -> Self {
        let dirs = tempfile::tempdir().expect("failed to create temp dirs");
        config.storage.upload_dir = dirs.path().join("uploads");
        config.storage.artifact_dir = dirs.path().join("artifacts");

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let image_engine = ScriptedEngine::new(MediaKind::Image, image);
        let audio_engine = ScriptedEngine::new(MediaKind::Audio, audio);
        let engines = Arc::new(EngineSet::new(image_engine.clone(), audio_engine.clone()));

        let ctx = AppContext {
            db: db.clone(),
            config: Arc::new(config),
            tools: Arc::new(ToolRegistry::empty()),
            engines,
            uploads: Arc::new(UploadStore::new()),
        };

        Self {
            ctx,
            db,
            image_engine,
            audio_engine,
            _dirs: dirs,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::serve(Self::new()).await
    }

    /// Start an Axum server with custom options on a random port.
    pub async fn with_server_options(
        config: Config,
        image: EngineBehavior,
        audio: EngineBehavior,
    ) -> (Self, SocketAddr) {
        Self::serve(Self::with_options(config, image, audio)).await
    }

    async fn serve(harness: Self) -> (Self, SocketAddr) {
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// The artifact directory this harness serves from.
    pub fn artifact_dir(&self) -> &Path {
        &self.ctx.config.storage.artifact_dir
    }

    /// The upload directory this harness admits files into.
    pub fn upload_dir(&self) -> &Path {
        &self.ctx.config.storage.upload_dir
    }

    /// Create a user with a bcrypt-hashed password and return its ID.
    pub fn create_user(&self, username: &str, password: &str) -> UserId {
        let conn = self.db.get().expect("failed to get db connection");
        let hash = bcrypt::hash(password, 4).expect("bcrypt hash failed");
        nf_db::queries::users::create_user(&conn, username, &hash)
            .expect("failed to create user")
            .id
    }
}

/// Build a multipart form for one submission.
pub fn submission_form(
    file_name: &str,
    bytes: &[u8],
    kind: Option<&str>,
    display_name: Option<&str>,
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
    );
    if let Some(kind) = kind {
        form = form.text("kind", kind.to_string());
    }
    if let Some(name) = display_name {
        form = form.text("name", name.to_string());
    }
    form
}
