//! novel-tts - Turn narrative text into speaker-attributed, multi-voice TTS audio

mod cast;
mod config;
mod error;
mod oracle;
mod pipeline;
mod prompts;
mod run;
mod text;
mod tts;
mod voice;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{NovelTtsConfig, process_env};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{Oracles, Pipeline};
use prompts::PromptSet;
use std::path::PathBuf;
use tts::Dispatcher;
use voice::VoiceProvider;

#[derive(Parser, Debug)]
#[command(name = "novel-tts")]
#[command(about = "Turn narrative text into speaker-attributed, multi-voice TTS audio", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the UTF-8 text file
    text_file: Option<PathBuf>,

    /// TTS provider (minimax, doubao); overrides config
    #[arg(short, long)]
    provider: Option<String>,

    /// Name of the run directory (default: <text-hash>_<timestamp>)
    #[arg(long)]
    run_name: Option<String>,

    /// Root directory for run output; overrides config
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Stop after writing script.json, without synthesis
    #[arg(long, default_value_t = false)]
    dry_run: bool,

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
    /// Set the characters that end a segment
    SetPunctuation {
        /// Punctuation characters, e.g. "，。！？：“”"
        chars: String,
    },
    /// Set the default TTS provider
    SetProvider {
        /// minimax or doubao
        provider: String,
    },
    /// Set the pause after each synthesis request
    SetPause {
        /// Milliseconds
        ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let text_path = args.text_file.clone().ok_or_else(|| {
        anyhow::anyhow!("Text file path is required. Run 'novel-tts --help' for usage.")
    })?;

    if !text_path.exists() {
        anyhow::bail!("Text file not found: {}", text_path.display());
    }

    let mut config = NovelTtsConfig::load().context("Failed to load configuration")?;
    config.apply_env();
    if let Some(provider) = &args.provider {
        config.tts_provider = provider.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }

    // Configuration errors surface before any oracle is built or called
    let provider = config.provider()?;
    config.punctuation()?;

    let text = std::fs::read_to_string(&text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;

    let prompts = PromptSet::resolve(config.prompts_dir.as_deref())?;
    let llm_config = llm_client::Config::load().context("Failed to load llm-client configuration")?;
    let oracles = Oracles::from_config(&llm_config, &config)?;

    if args.debug {
        eprintln!("Text: {}", text_path.display());
        eprintln!("Provider: {}", provider);
        eprintln!(
            "Oracles: roles={} speakers={} voices={}",
            oracles.roles.name(),
            oracles.speakers.name(),
            oracles.voices.name()
        );
    }

    // Build the synthesis backend up front so a missing credential fails fast
    let dispatcher = if args.dry_run {
        None
    } else {
        Some(
            Dispatcher::new(config.dispatch_pause())
                .with_backend(tts::create_backend(provider, &config, &process_env)?),
        )
    };

    let pipeline = Pipeline::new(&config, prompts, oracles)?;

    eprintln!("Analyzing text: {}", text_path.display());
    let script = pipeline.build_script(&text).await?;
    eprintln!(
        "Segments: {}, Roles: {}, Synthesis units: {}",
        script.segment_count,
        script.role_count,
        script.records.len()
    );

    let run_name = args.run_name.clone().unwrap_or_else(|| run::run_name(&text));
    let run_dir = run::run_dir(&config.output_root()?, pipeline.provider(), &run_name);
    let script_path = tts::write_script(&run_dir, &script.records)?;
    eprintln!("Script: {}", script_path.display());

    let Some(dispatcher) = dispatcher else {
        eprintln!("Dry run: skipping synthesis");
        return Ok(());
    };

    let pb = ProgressBar::new(script.records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let result = dispatcher
        .dispatch(&script.records, &run_dir, |record, _| {
            pb.set_message(record.speaker.clone().unwrap_or_default());
            pb.inc(1);
        })
        .await;

    match result {
        Ok(written) => {
            pb.finish_with_message("Synthesis complete!");
            eprintln!("Output: {} ({} files)", run_dir.display(), written.len());
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Synthesis failed");
            Err(e.into())
        }
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NovelTtsConfig::load()?;
            println!("Configuration file: {:?}", NovelTtsConfig::config_path()?);
            println!();
            match &config.segmentation_punctuation {
                Some(p) => println!("segmentation_punctuation = \"{}\"", p),
                None => println!("segmentation_punctuation = (none)"),
            }
            println!("tts_provider = \"{}\"", config.tts_provider);
            println!("dispatch_pause_ms = {}", config.dispatch_pause_ms);
            println!("drop_unattributed_lead = {}", config.drop_unattributed_lead);
            println!("output_dir = {}", config.output_root()?.display());
            if let Some(dir) = &config.prompts_dir {
                println!("prompts_dir = \"{}\"", dir.display());
            } else {
                println!("prompts_dir = (built-in)");
            }
            println!(
                "presets = roles:{} speakers:{} voices:{}",
                config.presets.roles, config.presets.speakers, config.presets.voices
            );
        }
        ConfigAction::SetPunctuation { chars } => {
            if chars.is_empty() {
                anyhow::bail!("Punctuation set must not be empty");
            }
            let mut config = NovelTtsConfig::load()?;
            config.segmentation_punctuation = Some(chars.clone());
            config.save()?;
            println!("Segmentation punctuation set to: {}", chars);
        }
        ConfigAction::SetProvider { provider } => {
            let parsed: VoiceProvider = provider.parse()?;
            let mut config = NovelTtsConfig::load()?;
            config.tts_provider = parsed.to_string();
            config.save()?;
            println!("Default TTS provider set to: {}", parsed);
        }
        ConfigAction::SetPause { ms } => {
            let mut config = NovelTtsConfig::load()?;
            config.dispatch_pause_ms = *ms;
            config.save()?;
            println!("Dispatch pause set to: {} ms", ms);
        }
    }
    Ok(())
}
