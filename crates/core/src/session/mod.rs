use crate::align::{self, GridEntry, TimedWord};
use crate::export::{self, ExportDocument};
use crate::external::Transcript;
use crate::footage::{self, Clip, FootageReport};
use crate::mapping::CoordinateMapper;
use crate::render::{RenderStyle, TimelineFrame, TimelineRenderer};
use crate::{Grid, Result, Tempo, Track};

/// Where the current tempo came from. `FallbackDefault` means detection
/// failed and the user should be prompted for manual entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoSource {
    Manual,
    Detected,
    FallbackDefault,
}

/// The aggregate state: one track, one tempo with its derived grid, the
/// aligned word sequence and the footage clips. All mutation happens on a
/// single logical thread of control; tempo, grid and entries are always
/// replaced together so no failure can leave them disagreeing.
#[derive(Debug)]
pub struct Session {
    track: Option<Track>,
    tempo: Tempo,
    tempo_source: TempoSource,
    grid: Grid,
    entries: Vec<GridEntry>,
    clips: Vec<Clip>,
}

impl Session {
    pub fn new() -> Self {
        let tempo = Tempo::fallback_default();
        Self {
            track: None,
            tempo,
            tempo_source: TempoSource::FallbackDefault,
            grid: Grid::from_tempo(tempo),
            entries: Vec::new(),
            clips: Vec::new(),
        }
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn tempo_source(&self) -> TempoSource {
        self.tempo_source
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn duration_seconds(&self) -> f64 {
        self.track
            .as_ref()
            .map(|track| track.duration_seconds)
            .unwrap_or(0.0)
    }

    /// Replaces the loaded track wholesale. The previous alignment belongs
    /// to the previous audio, so the entry sequence is cleared with it.
    pub fn load_track(&mut self, track: Track) {
        self.track = Some(track);
        self.entries = Vec::new();
    }

    /// Applies a manually entered tempo: the grid is rederived and every
    /// existing entry is rebuilt from its raw timestamp, as one atomic
    /// replacement.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.replace_tempo(tempo, TempoSource::Manual);
    }

    /// Applies the tempo-detection result. Out-of-range or failed detection
    /// falls back to the default tempo; the returned source tells the caller
    /// whether manual entry should be requested.
    pub fn apply_detected_bpm(&mut self, detected: Option<f64>) -> TempoSource {
        let (tempo, source) = match detected.and_then(|bpm| Tempo::new(bpm).ok()) {
            Some(tempo) => (tempo, TempoSource::Detected),
            None => (Tempo::fallback_default(), TempoSource::FallbackDefault),
        };
        self.replace_tempo(tempo, source);
        source
    }

    fn replace_tempo(&mut self, tempo: Tempo, source: TempoSource) {
        let grid = Grid::from_tempo(tempo);
        let entries = align::retempo(&self.entries, &grid);
        self.tempo = tempo;
        self.tempo_source = source;
        self.grid = grid;
        self.entries = entries;
    }

    /// Replaces the entry sequence from a transcription result, preserving
    /// the collaborator's word order.
    pub fn align_transcript(&mut self, transcript: &Transcript) {
        let words: Vec<TimedWord> = transcript
            .words
            .iter()
            .map(|word| TimedWord {
                text: word.word.clone(),
                start: word.start,
            })
            .collect();
        self.entries = align::align_timestamps(&words, &self.grid);
    }

    /// Replaces the entry sequence by spreading free-form lyrics evenly
    /// across quarter-note slots of the loaded track.
    pub fn distribute_lyrics(&mut self, text: &str) {
        self.entries = align::distribute_uniform(text, self.duration_seconds(), &self.grid);
    }

    pub fn add_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    pub fn remove_clip(&mut self, index: usize) -> Option<Clip> {
        if index < self.clips.len() {
            Some(self.clips.remove(index))
        } else {
            None
        }
    }

    pub fn clear_clips(&mut self) {
        self.clips.clear();
    }

    pub fn footage_report(&self) -> FootageReport {
        footage::report(&self.clips, self.duration_seconds())
    }

    /// The shared time-to-pixel mapping for the current duration and tempo.
    pub fn mapper(&self) -> CoordinateMapper {
        match &self.track {
            Some(track) => CoordinateMapper::new(track.duration_seconds, &self.grid),
            None => CoordinateMapper::empty(),
        }
    }

    /// Full redraw of both layers at the given display scale.
    pub fn render(&self, style: RenderStyle, scale: f64) -> TimelineFrame {
        let renderer = TimelineRenderer::new(style, scale);
        let samples: &[f32] = self
            .track
            .as_ref()
            .map(|track| track.primary_channel())
            .unwrap_or(&[]);
        renderer.render(samples, &self.grid, &self.entries, &self.mapper())
    }

    pub fn export_document(&self) -> ExportDocument {
        let name = self
            .track
            .as_ref()
            .map(|track| track.name.as_str())
            .unwrap_or("");
        export::build_document(
            name,
            self.tempo,
            self.duration_seconds(),
            &self.grid,
            &self.entries,
        )
    }

    pub fn export_json(&self) -> Result<String> {
        export::to_json(&self.export_document())
    }

    pub fn export_lrc(&self) -> String {
        export::to_lrc(&self.entries)
    }

    /// Returns to the empty start state.
    pub fn reset(&mut self) {
        *self = Session::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
