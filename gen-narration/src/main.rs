//! gen-narration - Narrate long text files with Kokoro TTS, chunk by chunk

mod audio;
mod config;
mod error;
mod job;
mod text;
mod tts;

use anyhow::{Context, Result};
use audio::WavEncoding;
use clap::{Parser, Subcommand};
use config::NarrationConfig;
use error::Error;
use indicatif::{ProgressBar, ProgressStyle};
use job::{JobOptions, JobPaths, JobPhase, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tts::{BackendKind, BackendOptions};

#[derive(Parser, Debug)]
#[command(name = "gen-narration")]
#[command(about = "Narrate a text file with Kokoro TTS, resuming from finished chunks", long_about = None)]
#[command(version)]
struct Args {
    /// Text file to synthesize
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Voice id (default: af_heart)
    #[arg(short, long)]
    voice: Option<String>,

    /// Output directory (default: out)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Approximate characters per chunk (default: 2000)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Crossfade duration in ms between chunks (default: 30, 0 disables)
    #[arg(long, allow_negative_numbers = true)]
    crossfade_ms: Option<i64>,

    /// Keep intermediate chunk WAV files
    #[arg(long)]
    keep_chunks: bool,

    /// Re-synthesize chunks even if their files already exist
    #[arg(long)]
    no_resume: bool,

    /// Show the chunk plan without synthesizing anything
    #[arg(long)]
    dry_run: bool,

    /// Synthesis backend
    #[arg(long, value_enum, default_value = "kokoro")]
    backend: BackendKind,

    /// WAV sample encoding (default: pcm16)
    #[arg(long, value_enum)]
    encoding: Option<WavEncoding>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice id (e.g. af_heart, bf_emma)
        voice: String,
    },
    /// Set default output directory
    SetOutDir {
        /// Directory path
        path: PathBuf,
    },
    /// Set default chunk size
    SetChunkSize {
        /// Characters per chunk (> 0)
        value: usize,
    },
    /// Set default crossfade
    SetCrossfade {
        /// Milliseconds (0 disables)
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Set default device
    SetDevice {
        /// cuda, cpu or mps
        device: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let input_file = args.input_file.clone().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Run 'gen-narration --help' for usage.")
    })?;

    let config = NarrationConfig::load().context("Failed to load configuration")?;

    let voice = args.voice.clone().unwrap_or(config.voice.clone());
    let out_dir = args.out_dir.clone().unwrap_or(config.out_dir.clone());
    let chunk_size = args.chunk_size.unwrap_or(config.chunk_size);
    let crossfade_ms = args.crossfade_ms.unwrap_or(config.crossfade_ms);
    let encoding = args.encoding.unwrap_or(config.encoding);

    log::debug!("Input: {}", input_file.display());
    log::debug!("Output dir: {}", out_dir.display());
    log::debug!("Voice: {}", voice);
    log::debug!("Chunk size: {}", chunk_size);
    log::debug!("Crossfade: {} ms", crossfade_ms);
    log::debug!("Encoding: {}", encoding);

    let content = std::fs::read_to_string(&input_file)
        .with_context(|| format!("Failed to read {}", input_file.display()))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::EmptyText.into());
    }

    let chunks = text::chunk_text(content, chunk_size)?;
    log::info!(
        "Split {} characters into {} chunks",
        content.chars().count(),
        chunks.len()
    );

    let paths = JobPaths::for_input(&out_dir, &input_file);

    if args.dry_run {
        print_plan(&chunks, &paths);
        return Ok(());
    }

    let backend_options = BackendOptions {
        lang_code: config.lang_code.clone(),
        device: config.device.clone(),
        cudnn_benchmark: config.cudnn_benchmark,
    };
    let backend = tts::create_backend(args.backend, &backend_options)
        .context("Failed to initialize TTS backend")?;
    log::info!("Using {} backend", backend.name());

    let options = JobOptions {
        voice,
        sample_rate: config.sample_rate,
        crossfade_ms,
        keep_chunks: args.keep_chunks || config.keep_chunks,
        resume: !args.no_resume,
        encoding,
    };
    let orchestrator = Orchestrator::new(backend.as_ref(), options);

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let result = orchestrator
        .run(&chunks, &paths, |progress| {
            pb.set_position(progress.done as u64);
            match progress.phase {
                JobPhase::Skipped => {
                    pb.set_message(format!("chunk {}/{} reused", progress.index + 1, progress.total))
                }
                JobPhase::Synthesized => {
                    pb.set_message(format!("chunk {}/{} done", progress.index + 1, progress.total))
                }
                JobPhase::Stitching => pb.set_message("stitching"),
                JobPhase::Cleaning => pb.set_message("removing chunks"),
            }
        })
        .await;

    let report = match result {
        Ok(report) => {
            pb.finish_with_message("Narration complete!");
            report
        }
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    let size_mb = std::fs::metadata(&report.output)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);

    let persisted = report
        .states
        .iter()
        .filter(|s| **s == job::ChunkState::Persisted)
        .count();
    eprintln!(
        "\nChunks: {}, Synthesized: {}, Reused: {}",
        persisted,
        report.synthesized.len(),
        report.skipped.len()
    );
    eprintln!(
        "Stitched {} chunk file(s), removed {}",
        report.stitched.len(),
        report.removed.len()
    );
    eprintln!(
        "Output: {} ({:.1} s, {:.1} MB)",
        report.output.display(),
        report.duration_secs(),
        size_mb
    );
    if !report.cleanup_failures.is_empty() {
        eprintln!(
            "Warning: {} chunk file(s) could not be removed",
            report.cleanup_failures.len()
        );
    }

    Ok(())
}

fn print_plan(chunks: &[String], paths: &JobPaths) {
    let planned = job::plan(chunks, paths);
    let done = planned.iter().filter(|c| c.done).count();

    for chunk in &planned {
        println!(
            "{} {:>5}  {:>6} chars  {}",
            if chunk.done { "[done]" } else { "[todo]" },
            chunk.index,
            chunk.chars,
            chunk.path.display()
        );
    }
    println!();
    println!(
        "{} chunks, {} already on disk, {} to synthesize",
        planned.len(),
        done,
        planned.len() - done
    );
    println!("Final output: {}", paths.output_path().display());
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrationConfig::load()?;
            println!("Configuration file: {:?}", NarrationConfig::config_path());
            println!();
            println!("voice = \"{}\"", config.voice);
            println!("out_dir = \"{}\"", config.out_dir.display());
            println!("chunk_size = {}", config.chunk_size);
            println!("crossfade_ms = {}", config.crossfade_ms);
            println!("keep_chunks = {}", config.keep_chunks);
            println!("sample_rate = {}", config.sample_rate);
            println!("encoding = \"{}\"", config.encoding);
            println!("lang_code = \"{}\"", config.lang_code);
            if let Some(device) = &config.device {
                println!("device = \"{}\"", device);
            } else {
                println!("device = (auto-detect)");
            }
            println!("cudnn_benchmark = {}", config.cudnn_benchmark);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrationConfig::load()?;
            config.voice = voice.clone();
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetOutDir { path } => {
            let mut config = NarrationConfig::load()?;
            config.out_dir = path.clone();
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
        ConfigAction::SetChunkSize { value } => {
            if *value == 0 {
                return Err(
                    Error::InvalidArgument("chunk size must be greater than 0".to_string()).into(),
                );
            }
            let mut config = NarrationConfig::load()?;
            config.chunk_size = *value;
            config.save()?;
            println!("Default chunk size set to: {}", config.chunk_size);
        }
        ConfigAction::SetCrossfade { value } => {
            let mut config = NarrationConfig::load()?;
            config.crossfade_ms = (*value).max(0);
            config.save()?;
            println!("Default crossfade set to: {} ms", config.crossfade_ms);
        }
        ConfigAction::SetDevice { device } => {
            let mut config = NarrationConfig::load()?;
            config.device = Some(device.clone());
            config.save()?;
            println!("Default device set to: {}", device);
        }
    }
    Ok(())
}
