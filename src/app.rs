//! Terminal front-end over the generation controller.
//!
//! Plays the presentation role: gates submissions while busy, decodes each new
//! image and reports decode failures back, renders the controller's signals as
//! text, and offers the download.

use crate::ai::{HuggingFaceImageClient, ImageGenerationService};
use crate::controller::{GenerationController, GenerationState, RENDER_FAILURE_MESSAGE};
use crate::image::{
    save_download, ImageHandle, ImageRenderService, ImageRenderer, RenderedImage,
};
use crate::models::{Config, DOWNLOAD_FILENAME};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

const PLACEHOLDER: &str = "Your generated image will appear here";
const BUSY_LABEL: &str = "Generating...";
const HELP: &str = "Type a prompt and press Enter to generate.\n\
Commands: :save (download current image), :help, :quit";

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub generator: Box<dyn ImageGenerationService>,
    pub renderer: Box<dyn ImageRenderService>,
}

pub struct App {
    controller: GenerationController,
    renderer: Box<dyn ImageRenderService>,
    output_dir: PathBuf,
    rendered: Option<(Uuid, RenderedImage)>,
}

impl App {
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Self {
        Self {
            controller: GenerationController::new(services.generator),
            renderer: services.renderer,
            output_dir,
            rendered: None,
        }
    }

    pub fn new(config: &Config) -> Self {
        info!("Inference endpoint: {}", config.endpoint);
        match config.request_timeout {
            Some(timeout) => info!("Request timeout: {}s", timeout.as_secs()),
            None => info!("Request timeout: none"),
        }

        Self::with_services(
            AppServices {
                generator: Box::new(HuggingFaceImageClient::from_config(config)),
                renderer: Box::new(ImageRenderer::new()),
            },
            config.output_dir.clone(),
        )
    }

    pub fn controller(&self) -> &GenerationController {
        &self.controller
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate one image and save it to the download location.
    ///
    /// On failure the error carries the text the controller is showing.
    pub async fn generate_once(&mut self, prompt: &str) -> Result<PathBuf> {
        self.controller.set_prompt(prompt);
        let handle = self.submit_and_render().await?;
        save_download(&handle, &self.output_dir).await
    }

    /// Save the currently displayed image, if any.
    pub async fn save_current(&self) -> Result<Option<PathBuf>> {
        match self.controller.state().visible_image() {
            Some(handle) => Ok(Some(save_download(handle, &self.output_dir).await?)),
            None => Ok(None),
        }
    }

    /// Line-oriented prompt loop. Each submission completes before the next
    /// line is read.
    pub async fn run_interactive<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(format!("{}\n\n", HELP).as_bytes()).await?;
        self.write_view(&mut output).await?;

        let mut lines = input.lines();
        loop {
            output.write_all(b"prompt> ").await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match line.trim() {
                ":quit" | ":q" => break,
                ":help" => {
                    output.write_all(format!("{}\n", HELP).as_bytes()).await?;
                    continue;
                }
                ":save" => {
                    let message = match self.save_current().await? {
                        Some(path) => format!("Saved to {}\n", path.display()),
                        None => "No image to save\n".to_string(),
                    };
                    output.write_all(message.as_bytes()).await?;
                    continue;
                }
                command if command.starts_with(':') => {
                    output
                        .write_all(format!("Unknown command '{}'\n", command).as_bytes())
                        .await?;
                    continue;
                }
                _ => {}
            }

            if self.controller.state().busy {
                output
                    .write_all(format!("{} please wait\n", BUSY_LABEL).as_bytes())
                    .await?;
                continue;
            }

            self.controller.set_prompt(&line);
            output
                .write_all(format!("{}\n", BUSY_LABEL).as_bytes())
                .await?;
            output.flush().await?;

            // Failures are already reflected in the controller state.
            let _ = self.submit_and_render().await;
            self.write_view(&mut output).await?;
        }

        output.flush().await?;
        Ok(())
    }

    async fn submit_and_render(&mut self) -> Result<ImageHandle> {
        let handle = self.controller.submit_current().await.into_result()?;

        match self.renderer.render(&handle).await {
            Ok(rendered) => {
                self.rendered = Some((handle.id(), rendered));
                Ok(handle)
            }
            Err(e) => {
                warn!("Could not display image {}: {}", handle.id(), e);
                self.rendered = None;
                self.controller.image_failed_to_load(handle.id());
                Err(Error::Render(RENDER_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    async fn write_view<W: AsyncWrite + Unpin>(&self, output: &mut W) -> Result<()> {
        let view = render_view(&self.controller.state(), self.rendered);
        output.write_all(view.as_bytes()).await?;
        output.write_all(b"\n").await?;
        Ok(())
    }
}

/// Text rendering of the controller's busy, error and image signals.
pub fn render_view(state: &GenerationState, rendered: Option<(Uuid, RenderedImage)>) -> String {
    let mut lines = Vec::new();

    if state.busy {
        lines.push(BUSY_LABEL.to_string());
    }
    if let Some(error) = &state.error {
        lines.push(format!("Error: {}", error));
    }

    match state.visible_image() {
        Some(handle) => {
            let dimensions = match rendered {
                Some((id, image)) if id == handle.id() => {
                    format!("{}x{} ", image.width, image.height)
                }
                _ => String::new(),
            };
            lines.push(format!(
                "Generated artwork: {}{}, {} bytes ({})",
                dimensions,
                handle.mime_type(),
                handle.len(),
                handle.url()
            ));
            lines.push(format!("Download: :save -> {}", DOWNLOAD_FILENAME));
        }
        None if !state.busy => lines.push(PLACEHOLDER.to_string()),
        None => {}
    }

    lines.join("\n")
}
