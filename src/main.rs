use crate::audio::AudioConfig;
use crate::audio::probe::FfprobeDuration;
use crate::commands::{Cli, Commands, ProcessCommand};
use crate::processor::AudiobookProcessor;
use crate::processor::models::{AudiobookMetadata, ProcessingOptions};
use anyhow::Result;
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::info;

mod audio;
mod chapters;
mod commands;
mod cue;
mod processor;
mod util;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(cmd) => {
            let processor = AudiobookProcessor::new(processing_options(cmd));
            let output_file = processor.process(&pb).await?;
            info!("Created {:?}", output_file);
        }
        Commands::CombineCue(cmd) => {
            let probe = FfprobeDuration::new();
            let output_file =
                cue::process_directory(&cmd.input_dir, &cmd.output_dir, &probe).await?;
            info!("Created {:?}", output_file);
        }
    }

    Ok(())
}

fn processing_options(cmd: ProcessCommand) -> ProcessingOptions {
    ProcessingOptions {
        input_dir: cmd.input_dir,
        output_dir: cmd.output_dir,
        output_format: cmd.format,
        audio_config: AudioConfig {
            bitrate: cmd.bitrate,
            channels: cmd.channels,
            sample_rate: cmd.sample_rate,
        },
        metadata: AudiobookMetadata {
            title: cmd.title,
            artist: cmd.artist,
            cover_art: cmd.cover,
        },
        dry_run: cmd.dry_run,
    }
}
