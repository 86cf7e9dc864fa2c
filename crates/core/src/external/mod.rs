//! Seams for the external collaborators: tempo detection, transcription,
//! interpreter discovery and clip duration probing. The core treats all of
//! them as potentially slow, cancellation-agnostic calls whose failure is
//! never fatal to the session.

mod task;

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

pub use task::{ExternalTask, ExternalTaskHandle};

use crate::{BeatlineError, Result};

/// Longest progress message surfaced to the user as transient status text.
pub const STATUS_TEXT_MAX: usize = 120;

/// One transcribed word. The engine aligns on `start`; `end` and the
/// detected language are preserved because the collaborator reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub word: String,
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}

/// Successful transcription payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub words: Vec<TranscriptWord>,
    pub language: Option<String>,
}

/// Estimates a BPM from decoded samples, or fails. The session falls back
/// to the default tempo on failure or an out-of-range result.
pub trait TempoDetector {
    fn detect(&self, channels: &[Vec<f32>], sample_rate: u32) -> Result<f64>;
}

/// Produces word timestamps for an audio file, streaming progress messages
/// before the final result.
pub trait Transcriber {
    fn transcribe(&self, audio_path: &Path, model_size: &str) -> ExternalTask<Transcript>;
}

/// Returns a clip duration in seconds, or `None` when the file is
/// unreadable or zero-length. Only positive durations are admitted.
pub trait ClipProber {
    fn probe_duration(&self, path: &Path) -> Option<f64>;
}

/// Probes for an available external interpreter executable. `None` disables
/// the transcription action.
pub fn discover_interpreter() -> Option<String> {
    ["python3", "python"]
        .into_iter()
        .find(|candidate| {
            Command::new(candidate)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        })
        .map(str::to_string)
}

/// Bounds a collaborator message to the status-text display length.
pub fn truncate_status(message: &str) -> String {
    if message.chars().count() <= STATUS_TEXT_MAX {
        return message.to_string();
    }
    let mut out: String = message.chars().take(STATUS_TEXT_MAX - 3).collect();
    out.push_str("...");
    out
}

/// Clip prober backed by WAV headers.
#[derive(Debug, Default)]
pub struct WavClipProber;

impl ClipProber for WavClipProber {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        let reader = hound::WavReader::open(path).ok()?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return None;
        }
        let seconds = reader.duration() as f64 / spec.sample_rate as f64;
        (seconds > 0.0).then_some(seconds)
    }
}

/// Transcriber that spawns the helper script under an external interpreter.
/// The script prints a single JSON object to stdout (`{"words": [...],
/// "language": ...}` on success, `{"error": ...}` on failure) and free-form
/// progress lines to stderr.
#[derive(Debug, Clone)]
pub struct ProcessTranscriber {
    interpreter: String,
    script: PathBuf,
}

impl ProcessTranscriber {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }
}

impl Transcriber for ProcessTranscriber {
    fn transcribe(&self, audio_path: &Path, model_size: &str) -> ExternalTask<Transcript> {
        let (handle, task) = ExternalTask::channel();
        let interpreter = self.interpreter.clone();
        let script = self.script.clone();
        let audio = audio_path.to_path_buf();
        let model = model_size.to_string();

        std::thread::spawn(move || {
            let result = run_transcription(&interpreter, &script, &audio, &model, &handle);
            handle.finish(result);
        });

        task
    }
}

fn run_transcription(
    interpreter: &str,
    script: &Path,
    audio: &Path,
    model: &str,
    handle: &ExternalTaskHandle<Transcript>,
) -> Result<Transcript> {
    let mut child = Command::new(interpreter)
        .arg(script)
        .arg(audio)
        .arg(model)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // The collaborator narrates on stderr while it works; surface each line
    // as bounded status text. Drained on its own thread so the parent can
    // consume stdout concurrently: a payload larger than the OS pipe buffer
    // would otherwise block the child mid-write and stderr would never
    // reach EOF.
    let stderr_reader = child.stderr.take().map(|stderr| {
        let progress = handle.clone();
        std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                if !line.trim().is_empty() {
                    progress.progress(truncate_status(&line));
                }
            }
        })
    });

    let output = child.wait_with_output()?;
    if let Some(reader) = stderr_reader {
        let _ = reader.join();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload = stdout.trim();
    if payload.is_empty() {
        return Err(BeatlineError::external(format!(
            "transcription produced no output ({})",
            output.status
        )));
    }
    parse_transcript_payload(payload)
}

#[derive(Debug, Deserialize)]
struct TranscriptPayload {
    #[serde(default)]
    words: Vec<TranscriptWord>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parses the collaborator's JSON payload, mapping its `error` field onto
/// the external-failure taxonomy.
pub fn parse_transcript_payload(json: &str) -> Result<Transcript> {
    let payload: TranscriptPayload = serde_json::from_str(json)?;
    if let Some(error) = payload.error {
        return Err(BeatlineError::External(error));
    }
    Ok(Transcript {
        words: payload.words,
        language: payload.language,
    })
}
