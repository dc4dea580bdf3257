use crate::error::RenderError;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops::FilterType, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::OnceCell};
use tracing::{debug, warn};
use uuid::Uuid;

pub const CANVAS_WIDTH: u32 = 1640;
pub const CANVAS_HEIGHT: u32 = 856;
pub const BACKGROUND_FILE: &str = "Basemap.png";
pub const FONT_FILE: &str = "LXGWWenKai-Medium.ttf";

const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A PNG written to disk for sending. The file is removed when this is dropped.
#[derive(Debug)]
pub struct RenderedImage {
    path: PathBuf,
}

impl RenderedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RenderedImage {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove rendered image {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Renders sign cards. Clones share the parsed font, which is loaded on the
/// first successful render.
#[derive(Clone)]
pub struct ImageRenderer {
    background: PathBuf,
    font: PathBuf,
    output_dir: PathBuf,
    loaded_font: Arc<OnceCell<Arc<FontVec>>>,
}

impl ImageRenderer {
    pub fn new(asset_dir: &Path) -> Self {
        Self::with_paths(
            asset_dir.join(BACKGROUND_FILE),
            asset_dir.join(FONT_FILE),
            std::env::temp_dir(),
        )
    }

    pub fn with_paths(background: PathBuf, font: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            background,
            font,
            output_dir,
            loaded_font: Arc::new(OnceCell::new()),
        }
    }

    /// Draw `text` centered on the background and write it to a temp file.
    pub async fn render(&self, text: &str, font_size: f32) -> Result<RenderedImage, RenderError> {
        for asset in [&self.background, &self.font] {
            let present = fs::metadata(asset).await.map(|m| m.is_file()).unwrap_or(false);
            if !present {
                return Err(RenderError::MissingAsset(asset.clone()));
            }
        }

        let font = self.font().await?;
        let renderer = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || renderer.render_blocking(&font, &text, font_size)).await?
    }

    async fn font(&self) -> Result<Arc<FontVec>, RenderError> {
        self.loaded_font
            .get_or_try_init(|| async {
                let path = self.font.clone();
                let font = tokio::task::spawn_blocking(move || -> Result<FontVec, RenderError> {
                    Ok(FontVec::try_from_vec(std::fs::read(path)?)?)
                })
                .await??;
                debug!("Loaded font {}", self.font.display());
                Ok::<_, RenderError>(Arc::new(font))
            })
            .await
            .cloned()
    }

    fn render_blocking(&self, font: &FontVec, text: &str, font_size: f32) -> Result<RenderedImage, RenderError> {
        let mut canvas = image::open(&self.background)?.to_rgba8();
        if canvas.dimensions() != (CANVAS_WIDTH, CANVAS_HEIGHT) {
            debug!("Resizing background from {:?}", canvas.dimensions());
            canvas = image::imageops::resize(&canvas, CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Triangle);
        }

        draw_centered(&mut canvas, font, PxScale::from(font_size), text);

        let image = RenderedImage {
            path: self.output_dir.join(format!("sign-{}.png", Uuid::new_v4())),
        };
        canvas.save(&image.path)?;
        Ok(image)
    }
}

fn draw_centered(canvas: &mut RgbaImage, font: &FontVec, scale: PxScale, text: &str) {
    let scaled = font.as_scaled(scale);
    let line_height = (scaled.height() + scaled.line_gap()).ceil() as u32;
    let lines: Vec<&str> = text.lines().collect();
    let widths: Vec<u32> = lines.iter().map(|line| text_size(scale, font, line).0).collect();

    let (x, y) = block_origin(&widths, line_height, canvas.dimensions());
    for (i, line) in lines.iter().enumerate() {
        draw_text_mut(canvas, TEXT_COLOR, x, y + (i as u32 * line_height) as i32, scale, font, line);
    }
}

/// Top-left corner that centers a left-aligned block of lines on the canvas.
fn block_origin(widths: &[u32], line_height: u32, (canvas_w, canvas_h): (u32, u32)) -> (i32, i32) {
    let block_w = widths.iter().copied().max().unwrap_or(0);
    let block_h = line_height * widths.len() as u32;
    let x = (i64::from(canvas_w) - i64::from(block_w)) / 2;
    let y = (i64::from(canvas_h) - i64::from(block_h)) / 2;
    (x as i32, y as i32)
}
