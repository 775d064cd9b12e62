//! Markup-to-PNG rasterization behind a narrow trait.
//!
//! The pipeline only needs `rasterize(document, capture_target, scale)`; the
//! production implementation drives a headless Chromium.

use std::path::PathBuf;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use headless_chrome::browser::tab::element::BoxModel;
use headless_chrome::protocol::cdp::Page::{self, CaptureScreenshotFormatOption};
use headless_chrome::{Browser, LaunchOptions};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("capture target '{0}' not found in document")]
    CaptureTargetMissing(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

pub trait Rasterizer: Send + Sync {
    /// Render `document` and return the PNG of the element matched by
    /// `capture_target`, at `scale` device pixels per CSS pixel.
    fn rasterize(&self, document: &str, capture_target: &str, scale: f64) -> Result<Vec<u8>, RenderError>;
}

/// Headless Chromium, launched fresh for every capture
pub struct ChromeRasterizer {
    chrome_path: Option<PathBuf>,
    sandbox: bool,
    window_size: (u32, u32),
    timeout: Duration,
}

impl ChromeRasterizer {
    pub fn new(chrome_path: Option<PathBuf>, sandbox: bool) -> Self {
        Self {
            chrome_path,
            sandbox,
            window_size: (640, 900),
            timeout: Duration::from_secs(30),
        }
    }

    fn launch(&self) -> Result<Browser, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.sandbox)
            .path(self.chrome_path.clone())
            .window_size(Some(self.window_size))
            .idle_browser_timeout(self.timeout)
            .build()
            .map_err(|e| RenderError::EngineUnavailable(e.to_string()))?;

        Browser::new(options).map_err(|e| RenderError::EngineUnavailable(e.to_string()))
    }
}

/// Clip to the element's border box. The margin box would pull in the
/// page background around the card.
fn capture_clip(box_model: &BoxModel, scale: f64) -> Page::Viewport {
    let mut clip = box_model.border_viewport();
    clip.scale = scale;
    clip
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize(&self, document: &str, capture_target: &str, scale: f64) -> Result<Vec<u8>, RenderError> {
        // The browser process is killed when `browser` drops, on every exit path
        let browser = self.launch()?;
        debug!("Chromium launched for capture of {}", capture_target);

        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::EngineUnavailable(e.to_string()))?;
        tab.set_default_timeout(self.timeout);

        let url = format!(
            "data:text/html;charset=utf-8;base64,{}",
            general_purpose::STANDARD.encode(document)
        );
        tab.navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RenderError::CaptureFailed(format!("Failed to load document: {}", e)))?;

        let element = tab
            .wait_for_element(capture_target)
            .map_err(|_| RenderError::CaptureTargetMissing(capture_target.to_string()))?;

        let box_model = element
            .get_box_model()
            .map_err(|e| RenderError::CaptureFailed(format!("Failed to measure capture target: {}", e)))?;
        let clip = capture_clip(&box_model, scale);

        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| RenderError::CaptureFailed(e.to_string()))?;

        debug!("Captured {} bytes", png.len());
        Ok(png)
    }
}
