use std::fs::File;
use std::io;
use std::sync::Arc;

use clap::Parser;
use imagine::Provider;
use imagine::core::config::{self, ImagineConfig, ResolvedConfig};
use imagine::core::headless;
use imagine::core::pipeline::Pipeline;
use imagine::generation::{HttpPreloader, ImageGenerator, build_generator};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "imagine", about = "Turn a text prompt into a generated image")]
struct Args {
    /// Image generator to use (overrides config and IMAGINE_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Generate one image for this prompt, print its URL and exit
    #[arg(long)]
    prompt: Option<String>,

    /// Log level written to imagine.log
    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to imagine.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("imagine.log") {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        ImagineConfig::default()
    });
    let resolved = config::resolve(&file_config, args.provider);
    log::info!(
        "Imagine starting up with provider: {:?} (timeout: {:?})",
        resolved.provider,
        resolved.request_timeout
    );

    let generator = build_generator(&resolved).map_err(io::Error::other)?;

    match args.prompt {
        Some(prompt) => generate_once(&resolved, generator, prompt).await,
        None => imagine::tui::run(&resolved, generator),
    }
}

/// Headless mode: print the URL on stdout and the summary on stderr.
async fn generate_once(
    config: &ResolvedConfig,
    generator: Arc<dyn ImageGenerator>,
    prompt: String,
) -> io::Result<()> {
    let pipeline = Pipeline::new(generator, Arc::new(HttpPreloader::new(config.max_image_bytes)))
        .with_timeout(config.request_timeout);
    let output = headless::generate_once(Arc::new(pipeline), prompt).await?;
    println!("{}", output.url);
    eprintln!("{}", output.summary);
    Ok(())
}
