mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smear_core::config::{DEFAULT_LOG_BASE, DEFAULT_VISIBLE_LAYERS};
use smear_core::{AlphaScalingMode, Extent, TrailConfig};

#[derive(Parser)]
#[command(
    name = "smear",
    version,
    about = "Smear — fading motion-trail compositor",
    long_about = "Smear keeps a ring of recently rendered frames and composites them\nwith fading opacity. This tool drives it headlessly and writes PNG frames."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a sprite through the trail compositor and write PNG frames
    Render(render::RenderArgs),

    /// Display version and default trail settings
    Info,

    /// Write a trail.toml with default settings
    InitConfig {
        /// Where to write the config file
        #[arg(default_value = "trail.toml")]
        path: PathBuf,

        /// Number of history layers in the ring
        #[arg(long, default_value_t = 8)]
        capacity: usize,

        /// Surface size as WIDTHxHEIGHT
        #[arg(long, default_value = "320x240")]
        size: Extent,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Render(args) => render::run(args),
        Commands::Info => cmd_info(),
        Commands::InitConfig {
            path,
            capacity,
            size,
            force,
        } => cmd_init_config(path, capacity, size, force),
    }
}

fn cmd_info() -> Result<()> {
    println!("Smear trail compositor");
    println!("   Version:        {}", env!("CARGO_PKG_VERSION"));
    println!("   Backend:        CPU (RGBA8 software blending)");
    println!("   Visible layers: {} (default)", DEFAULT_VISIBLE_LAYERS);
    println!("   Alpha scaling:  {} (default)", AlphaScalingMode::default());
    println!("   Log base:       {} (default)", DEFAULT_LOG_BASE);
    Ok(())
}

fn cmd_init_config(path: PathBuf, capacity: usize, size: Extent, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = TrailConfig::with_capacity(capacity);
    config.dimensions = size;
    config
        .validate()
        .context("refusing to write an invalid trail config")?;
    config
        .save_to_file(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!("Wrote trail config to {}", path.display());
    Ok(())
}
