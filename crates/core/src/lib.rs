//! Core library for the Beatline lyric alignment application.
//!
//! The crate owns all algorithmic content of the system: deriving rhythmic
//! intervals from a tempo, snapping and classifying timestamps, the shared
//! time-to-pixel mapping, the layered timeline renderer, the word alignment
//! pipeline and the footage tracker. File pickers, dialogs and process
//! plumbing stay outside; the `external` module defines the seams they
//! plug into.

pub mod align;
pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod external;
pub mod footage;
pub mod grid;
pub mod mapping;
pub mod render;
pub mod session;
pub mod timefmt;

pub use align::{GridEntry, TimedWord};
pub use audio::Track;
pub use config::{AppConfig, TranscriptionConfig};
pub use error::{BeatlineError, Result};
pub use export::ExportDocument;
pub use external::{
    discover_interpreter, ClipProber, ExternalTask, ProcessTranscriber, TempoDetector,
    Transcriber, Transcript, TranscriptWord, WavClipProber,
};
pub use footage::{Clip, FootageReport};
pub use grid::{Grid, GridLevel, RhythmClass, Tempo};
pub use mapping::CoordinateMapper;
pub use render::{Layer, PaintTarget, RenderStyle, TimelineFrame, TimelineRenderer};
pub use session::{Session, TempoSource};
