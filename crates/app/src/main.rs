use std::path::{Path, PathBuf};
use std::time::Duration;

use beatline_core::render::svg::SvgTarget;
use beatline_core::{
    discover_interpreter, external, timefmt, AppConfig, ClipProber, ProcessTranscriber,
    Session, Tempo, Track, Transcriber, WavClipProber,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() -> beatline_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Render {
            audio,
            bpm,
            words,
            text,
            out_dir,
            scale,
        } => run_render(
            &config,
            &audio,
            bpm,
            words.as_deref(),
            text.as_deref(),
            &out_dir,
            scale,
        ),
        Commands::Align {
            audio,
            bpm,
            words,
            text,
            json,
            lrc,
        } => run_align(
            &audio,
            bpm,
            words.as_deref(),
            text.as_deref(),
            json.as_deref(),
            lrc.as_deref(),
        ),
        Commands::Transcribe {
            audio,
            bpm,
            model,
            script,
        } => run_transcribe(&config, &audio, bpm, model.as_deref(), script.as_deref()),
        Commands::Footage { audio, clips } => run_footage(&audio, &clips),
    }
}

fn run_render(
    config: &AppConfig,
    audio: &Path,
    bpm: Option<f64>,
    words: Option<&Path>,
    text: Option<&str>,
    out_dir: &Path,
    scale: f64,
) -> beatline_core::Result<()> {
    let mut session = load_session(audio, bpm)?;
    apply_lyrics(&mut session, words, text)?;

    let frame = session.render(config.render.clone(), scale);
    std::fs::create_dir_all(out_dir)?;
    let waveform_path = out_dir.join("waveform.svg");
    let overlay_path = out_dir.join("overlay.svg");
    std::fs::write(&waveform_path, SvgTarget::document_for(&frame.waveform))?;
    std::fs::write(&overlay_path, SvgTarget::document_for(&frame.overlay))?;

    tracing::info!(
        width = frame.overlay.width,
        words = session.entries().len(),
        ?waveform_path,
        ?overlay_path,
        "timeline rendered"
    );
    Ok(())
}

fn run_align(
    audio: &Path,
    bpm: Option<f64>,
    words: Option<&Path>,
    text: Option<&str>,
    json: Option<&Path>,
    lrc: Option<&Path>,
) -> beatline_core::Result<()> {
    let mut session = load_session(audio, bpm)?;
    apply_lyrics(&mut session, words, text)?;

    if let Some(path) = json {
        std::fs::write(path, session.export_json()?)?;
        tracing::info!(?path, "wrote JSON export");
    }
    if let Some(path) = lrc {
        std::fs::write(path, session.export_lrc())?;
        tracing::info!(?path, "wrote LRC export");
    }
    if json.is_none() && lrc.is_none() {
        println!("{}", session.export_json()?);
    }
    Ok(())
}

fn run_transcribe(
    config: &AppConfig,
    audio: &Path,
    bpm: Option<f64>,
    model: Option<&str>,
    script: Option<&Path>,
) -> beatline_core::Result<()> {
    let mut session = load_session(audio, bpm)?;

    // Flags override the configuration defaults.
    let model = model.unwrap_or(&config.transcription.model_size);
    let script = script
        .or(config.transcription.script.as_deref())
        .unwrap_or(Path::new("scripts/transcribe.py"));

    let interpreter = discover_interpreter().ok_or_else(|| {
        beatline_core::BeatlineError::external(
            "no python interpreter found; transcription is disabled",
        )
    })?;
    tracing::info!(%interpreter, model, "starting transcription");

    let transcriber = ProcessTranscriber::new(interpreter, script);
    let task = transcriber.transcribe(audio, model);
    let transcript = loop {
        while let Some(message) = task.try_progress() {
            tracing::info!("{}", external::truncate_status(&message));
        }
        if let Some(result) = task.try_result() {
            break result?;
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    if let Some(language) = &transcript.language {
        tracing::info!(%language, words = transcript.words.len(), "transcription done");
    }
    session.align_transcript(&transcript);
    for entry in session.entries() {
        println!(
            "[{}] {:<10} raw {:.4}  snapped {:.4}",
            entry.class.as_str(),
            entry.word,
            entry.raw_start,
            entry.snapped_start
        );
    }
    Ok(())
}

fn run_footage(audio: &Path, clips: &[PathBuf]) -> beatline_core::Result<()> {
    let mut session = load_session(audio, None)?;

    let prober = WavClipProber;
    for path in clips {
        match prober.probe_duration(path) {
            Some(duration_seconds) => session.add_clip(beatline_core::Clip {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                path: path.clone(),
                duration_seconds,
            }),
            // Unreadable or zero-length clips are excluded, not fatal.
            None => tracing::warn!(?path, "clip skipped: unreadable or empty"),
        }
    }

    let report = session.footage_report();
    println!(
        "footage {} / song {}  ({}%)",
        timefmt::format_clock(report.total_clip_seconds),
        timefmt::format_clock(session.duration_seconds()),
        report.raw_percent.round()
    );
    println!(
        "remaining {}  done: {}  over: {}",
        timefmt::format_clock(report.remaining_seconds),
        report.done,
        report.over
    );
    Ok(())
}

fn load_session(audio: &Path, bpm: Option<f64>) -> beatline_core::Result<Session> {
    let track = Track::from_wav(audio)?;
    tracing::info!(
        name = %track.name,
        duration = track.duration_seconds,
        "loaded track"
    );

    let mut session = Session::new();
    session.load_track(track);
    match bpm {
        Some(bpm) => session.set_tempo(Tempo::new(bpm)?),
        None => {
            // No detector is wired into the CLI; manual --bpm is the
            // first-class path and the default tempo keeps things usable.
            session.apply_detected_bpm(None);
            tracing::warn!("no --bpm given; using default tempo 120");
        }
    }
    Ok(session)
}

fn apply_lyrics(
    session: &mut Session,
    words: Option<&Path>,
    text: Option<&str>,
) -> beatline_core::Result<()> {
    if let Some(path) = words {
        let payload = std::fs::read_to_string(path)?;
        let transcript = external::parse_transcript_payload(&payload)?;
        session.align_transcript(&transcript);
    } else if let Some(text) = text {
        session.distribute_lyrics(text);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Align lyrics to a beat grid and render the timeline", long_about = None)]
struct Cli {
    /// JSON configuration file (render style, transcription defaults).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the waveform and beat/word overlay layers as SVG files.
    Render {
        /// WAV file to load.
        audio: PathBuf,
        /// Tempo in BPM; defaults to 120 when omitted.
        #[arg(long)]
        bpm: Option<f64>,
        /// JSON file with word timestamps ({"words": [{word, start}, ...]}).
        #[arg(long)]
        words: Option<PathBuf>,
        /// Free-form lyrics spread evenly across the beat grid.
        #[arg(long, conflicts_with = "words")]
        text: Option<String>,
        /// Directory for the generated SVG layers.
        #[arg(long, default_value = "timeline")]
        out_dir: PathBuf,
        /// Display scale factor (2.0 for high-density output).
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
    /// Align words to the grid and export the result.
    Align {
        audio: PathBuf,
        #[arg(long)]
        bpm: Option<f64>,
        #[arg(long)]
        words: Option<PathBuf>,
        #[arg(long, conflicts_with = "words")]
        text: Option<String>,
        /// Write the JSON export here.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the LRC export here.
        #[arg(long)]
        lrc: Option<PathBuf>,
    },
    /// Run the external transcription helper and align its words.
    Transcribe {
        audio: PathBuf,
        #[arg(long)]
        bpm: Option<f64>,
        /// Model-size hint forwarded to the helper; overrides the config.
        #[arg(long)]
        model: Option<String>,
        /// Path to the transcription helper script; overrides the config.
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Compare total clip footage against the song duration.
    Footage {
        /// The song the clips are measured against.
        audio: PathBuf,
        /// Clip files; unreadable ones are skipped.
        clips: Vec<PathBuf>,
    },
}
