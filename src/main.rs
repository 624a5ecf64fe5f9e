use anyhow::Result;
use clap::{Parser, Subcommand};
use promptcanvas::app::App;
use promptcanvas::models::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "promptcanvas")]
#[command(about = "Generate images from text prompts")]
struct CliArgs {
    /// Directory the download is saved to (overrides OUTPUT_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a single image and save it.
    Generate {
        /// Text describing the desired image.
        #[arg(value_name = "PROMPT")]
        prompt: String,
    },
    /// Read prompts from stdin, one per line.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptcanvas=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let mut app = App::new(&config);

    match args.command {
        Command::Generate { prompt } => match app.generate_once(&prompt).await {
            Ok(path) => {
                info!("Image saved to {}", path.display());
                println!("{}", path.display());
                Ok(())
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                std::process::exit(1);
            }
        },
        Command::Interactive => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            app.run_interactive(stdin, tokio::io::stdout()).await?;
            Ok(())
        }
    }
}
