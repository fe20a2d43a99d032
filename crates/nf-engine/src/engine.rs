//! The conversion-engine capability and its two real implementations.
//!
//! Each engine wraps one out-of-process executable behind the narrow
//! [`ConversionEngine`] interface, so the dispatcher selects by media kind
//! instead of branching on it, and tests substitute scripted engines without
//! spawning processes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use nf_core::MediaKind;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// An external notation-conversion engine.
///
/// Implementations run their executable against `input`, writing all output
/// files into `output_dir`. Success and failure are communicated solely via
/// the returned `Result`; the engine never touches the record store.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// The media kind this engine accepts.
    fn kind(&self) -> MediaKind;

    /// Name of the underlying executable (for error reporting).
    fn tool_name(&self) -> &str;

    /// Run the engine. Blocking only for the duration of the external job,
    /// which is bounded by the configured timeout.
    async fn run(&self, input: &Path, output_dir: &Path) -> nf_core::Result<()>;
}

/// Audiveris: optical music recognition for scanned sheet-music images.
pub struct AudiverisEngine {
    tools: Arc<ToolRegistry>,
    timeout: Duration,
}

impl AudiverisEngine {
    pub fn new(tools: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }

    /// Argument list for one batch transcription run.
    fn build_args(input: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            "-batch".into(),
            "-transcribe".into(),
            "-export".into(),
            "-output".into(),
            output_dir.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl ConversionEngine for AudiverisEngine {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn tool_name(&self) -> &str {
        "audiveris"
    }

    async fn run(&self, input: &Path, output_dir: &Path) -> nf_core::Result<()> {
        let tool = self.tools.require(self.tool_name())?;

        tracing::info!("audiveris transcribing {:?}", input);

        ToolCommand::new(tool.path.clone())
            .args(Self::build_args(input, output_dir))
            .timeout(self.timeout)
            .execute()
            .await?;

        Ok(())
    }
}

/// basic-pitch: pitch transcription for audio recordings.
///
/// Only the MIDI export is requested; sonification, raw model outputs, and
/// note-event dumps are suppressed by leaving their flags off.
pub struct BasicPitchEngine {
    tools: Arc<ToolRegistry>,
    timeout: Duration,
}

impl BasicPitchEngine {
    pub fn new(tools: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }

    /// Argument list for one transcription run: output directory then input,
    /// with no auxiliary-output flags.
    fn build_args(input: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            output_dir.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl ConversionEngine for BasicPitchEngine {
    fn kind(&self) -> MediaKind {
        MediaKind::Audio
    }

    fn tool_name(&self) -> &str {
        "basic-pitch"
    }

    async fn run(&self, input: &Path, output_dir: &Path) -> nf_core::Result<()> {
        let tool = self.tools.require(self.tool_name())?;

        tracing::info!("basic-pitch transcribing {:?}", input);

        ToolCommand::new(tool.path.clone())
            .args(Self::build_args(input, output_dir))
            .timeout(self.timeout)
            .execute()
            .await?;

        Ok(())
    }
}

/// The pair of engines the dispatcher selects from by media kind.
#[derive(Clone)]
pub struct EngineSet {
    image: Arc<dyn ConversionEngine>,
    audio: Arc<dyn ConversionEngine>,
}

impl EngineSet {
    /// Build a set from explicit engines (tests inject scripted ones here).
    pub fn new(image: Arc<dyn ConversionEngine>, audio: Arc<dyn ConversionEngine>) -> Self {
        Self { image, audio }
    }

    /// Build the production set backed by the discovered tools.
    pub fn discover(tools: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self {
            image: Arc::new(AudiverisEngine::new(Arc::clone(&tools), timeout)),
            audio: Arc::new(BasicPitchEngine::new(tools, timeout)),
        }
    }

    /// Select the engine for a media kind.
    pub fn engine_for(&self, kind: MediaKind) -> &dyn ConversionEngine {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }
}

/// Expose the arg builders for dispatch-layer tests.
#[doc(hidden)]
pub fn audiveris_args(input: &Path, output_dir: &Path) -> Vec<String> {
    AudiverisEngine::build_args(input, output_dir)
}

#[doc(hidden)]
pub fn basic_pitch_args(input: &Path, output_dir: &Path) -> Vec<String> {
    BasicPitchEngine::build_args(input, output_dir)
}
