//! pixup CLI - integer-factor upscaling for sprites and textures.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pixup::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pixup")]
#[command(about = "Upscale sprites and textures by an integer factor with a cleanup pass")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upscale a single image
    Process {
        /// Input image (png, jpg, jpeg or gif)
        input: PathBuf,

        /// Output path; the input's format is kept
        output: PathBuf,

        /// Linear scale factor
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        scale: Option<u32>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Watch a folder and upscale new images as they appear
    Watch {
        /// Folder to scan
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Folder receiving upscaled images
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds between scans
        #[arg(long)]
        interval: Option<u64>,

        /// Linear scale factor
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        scale: Option<u32>,

        /// Scan once and exit
        #[arg(long)]
        once: bool,

        /// Print the batch report as JSON (with --once)
        #[arg(long)]
        json: bool,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// TOML configuration file to merge over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(fix) = e.downcast_ref::<PixupError>().and_then(|e| e.suggested_fix()) {
                eprintln!("Hint: {}", fix);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Process {
            input,
            output,
            scale,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(scale) = scale {
                config = config.with_scale_factor(scale);
            }
            process(config, &input, &output)
        }
        Commands::Watch {
            input,
            output,
            interval,
            scale,
            once,
            json,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = input {
                config = config.with_input_dir(dir);
            }
            if let Some(dir) = output {
                config = config.with_output_dir(dir);
            }
            if let Some(secs) = interval {
                config = config.with_scan_interval(secs);
            }
            if let Some(scale) = scale {
                config = config.with_scale_factor(scale);
            }
            watch(config, once, json)
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<UpscaleConfig> {
    match path {
        Some(path) => UpscaleConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(UpscaleConfig::default()),
    }
}

fn process(config: UpscaleConfig, input: &Path, output: &Path) -> anyhow::Result<ExitCode> {
    let upscaler = Upscaler::new(config).map_err(PixupError::from)?;
    let outcome = upscaler
        .process_file(input, output)
        .map_err(PixupError::from)
        .with_context(|| format!("processing {}", input.display()))?;

    println!(
        "{} -> {} ({}x{} -> {}x{}, {} pass)",
        input.display(),
        output.display(),
        outcome.source_width,
        outcome.source_height,
        outcome.width,
        outcome.height,
        outcome.pass
    );
    Ok(ExitCode::SUCCESS)
}

fn watch(config: UpscaleConfig, once: bool, json: bool) -> anyhow::Result<ExitCode> {
    let watcher = Watcher::new(config)?;
    if !once {
        watcher.run();
    }

    let report = watcher.scan_once()?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        for file in report.failures() {
            if let FileStatus::Failed { error } = &file.status {
                eprintln!("  failed: {} ({})", file.input.display(), error);
            }
        }
        println!("{} processed, {} failed", report.processed, report.failed);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
