use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use image_reel::{
    config::{Config, RunConfig, SearchCredentials},
    images::{provider_for, Mode, VideoFormat},
    video::TransitionStyle,
    GeneratorError, VideoGenerator,
};

#[derive(Parser)]
#[command(
    name = "image-reel",
    version,
    about = "Turn a keyword query into a slideshow video",
    long_about = "Image-Reel fetches images matching a query, animates each one with a slow zoom and pan, joins them with transitions and encodes the result as a video file."
)]
struct Cli {
    /// Image source: bundled fixtures (test) or web image search (production)
    #[arg(long, value_enum, default_value = "test")]
    mode: Mode,

    /// Output aspect ratio
    #[arg(long, value_enum, default_value = "horizontal")]
    format: VideoFormat,

    /// Search query used to find images
    #[arg(short, long, default_value = "wizard of oz")]
    keywords: String,

    /// Maximum number of images to include
    #[arg(short, long, default_value_t = 5)]
    max_images: usize,

    /// Output video file path
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Seconds each image stays on screen
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Seconds adjacent images overlap during a transition
    #[arg(short, long, default_value_t = 1.0)]
    transition: f64,

    /// Transition between images; overrides the configuration file
    #[arg(long, value_enum)]
    transition_style: Option<TransitionStyle>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of bundled images used in test mode
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            mode: self.mode,
            format: self.format,
            keywords: self.keywords.clone(),
            max_images: self.max_images,
            output_path: self.output.clone(),
            image_duration: self.duration,
            transition_duration: self.transition,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Image-Reel v{}", env!("CARGO_PKG_VERSION"));

    generate(&cli).await.map_err(|e| {
        error!("{}", e);
        anyhow!(e.user_message())
    })
}

async fn generate(cli: &Cli) -> Result<(), GeneratorError> {
    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(fixtures) = &cli.fixtures {
        config.sources.fixtures_dir = fixtures.clone();
    }

    if let Some(style) = cli.transition_style {
        config.motion.transition_style = style;
    }

    let run = cli.run_config();
    let provider = provider_for(run.mode, &config.sources, SearchCredentials::from_env)?;
    let generator = VideoGenerator::new(run, config, provider)?;

    let video = generator.run().await?;
    info!("Generation complete! {} images, {:.2}s, saved to: {:?}",
          video.clip_count, video.duration, video.path);
    Ok(())
}
