use ab_glyph::FontVec;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Make sure the font file exists, downloading it from `url` if it doesn't.
///
/// Returns whether the font is available afterwards.
pub async fn ensure_font(path: &Path, url: Option<&str>) -> Result<bool> {
    if fs::try_exists(path).await? {
        return Ok(true);
    }

    let Some(url) = url else {
        warn!("Font {} not found and no download URL configured", path.display());
        return Ok(false);
    };

    info!("Downloading font from {} to {}", url, path.display());
    let bytes = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("Failed to fetch font from {}", url))?
        .bytes()
        .await?;

    FontVec::try_from_vec(bytes.to_vec()).context("Downloaded file is not a usable font")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension("part");
    fs::write(&partial, &bytes).await?;
    fs::rename(&partial, path).await?;

    info!("Font saved to {}", path.display());
    Ok(true)
}
