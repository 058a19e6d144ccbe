//! Single-utterance voice capture CLI

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use uttercap::{
    output, CaptureSession, Config, EnergyVad, FrameSource, MicCapture, TranscriptResult,
    WavSource, WhisperSink,
};

/// Single-utterance voice capture and transcription
#[derive(Parser)]
#[command(name = "uttercap")]
#[command(about = "Capture one spoken utterance from the microphone and transcribe it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv); diagnostics go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for one utterance and print the transcript as a JSON line
    Listen {
        /// Path to the Whisper model file
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Audio input device name (uses default if not specified)
        #[arg(short, long)]
        device: Option<String>,

        /// Read audio from a WAV file instead of the microphone
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Maximum session duration in seconds
        #[arg(short, long)]
        seconds: Option<f32>,

        /// Trailing silence that ends the utterance (ms)
        #[arg(long)]
        silence_ms: Option<u64>,

        /// Minimum consecutive speech run to confirm the utterance (ms)
        #[arg(long)]
        min_speech_ms: Option<u64>,

        /// VAD aggressiveness (0-3)
        #[arg(long)]
        vad_level: Option<u8>,

        /// Language code (e.g., en, ru, de, fr, es)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List available audio input devices
    Devices,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Quiet by default, use -v for more; the JSON result owns stdout so
    // all diagnostics go to stderr
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone();

    match cli.command {
        Commands::Listen {
            model,
            device,
            input,
            seconds,
            silence_ms,
            min_speech_ms,
            vad_level,
            language,
        } => {
            let mut config = match load_config(config_path.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    return emit(&TranscriptResult::failure(format!("{:#}", e)));
                }
            };
            if let Some(model) = model {
                config.stt.model_path = model;
            }
            if let Some(device) = device {
                config.audio.device = Some(device);
            }
            if let Some(seconds) = seconds {
                config.session.max_seconds = seconds;
            }
            if let Some(silence_ms) = silence_ms {
                config.session.silence_ms = silence_ms;
            }
            if let Some(min_speech_ms) = min_speech_ms {
                config.session.min_speech_ms = min_speech_ms;
            }
            if let Some(vad_level) = vad_level {
                config.vad.aggressiveness = vad_level;
            }
            if let Some(language) = language {
                config.stt.language = language;
            }

            let result = match listen(config, input) {
                Ok(result) => result,
                Err(e) => TranscriptResult::failure(format!("{:#}", e)),
            };
            emit(&result)
        }
        Commands::Devices => match list_devices() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Print the single result line and map it to the process exit status
fn emit(result: &TranscriptResult) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    if output::write_result(&mut stdout, result).is_err() {
        return ExitCode::FAILURE;
    }
    if result.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Capture one utterance and return its transcript.
///
/// Setup failures surface here as errors; the caller normalizes them into the
/// same result shape the session produces.
fn listen(config: Config, input: Option<PathBuf>) -> Result<TranscriptResult> {
    config.validate().context("Invalid configuration")?;

    // The model is the most likely thing to be missing, resolve it first
    info!("Loading model from: {}", config.stt.model_path.display());
    let sink = WhisperSink::new(config.stt.clone()).context("Failed to initialize recognizer")?;
    let classifier = EnergyVad::new(&config.vad);

    let source: Box<dyn FrameSource> = match input {
        Some(path) => Box::new(
            WavSource::open(&path, config.audio.sample_rate)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => {
            let mut mic = MicCapture::new(config.audio.clone());
            mic.init().context("Failed to initialize audio capture")?;
            mic.start().context("Failed to start audio capture")?;
            info!("Listening...");
            Box::new(mic)
        }
    };

    Ok(CaptureSession::new(&config, source, classifier, sink).run())
}

/// List available audio input devices
fn list_devices() -> Result<()> {
    let capture = MicCapture::new(uttercap::AudioConfig::default());
    let devices = capture.list_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        println!("Available audio input devices:");
        for (i, name) in devices.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}
