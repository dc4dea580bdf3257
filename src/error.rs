use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("data file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown coin reason in history: {0}")]
    UnknownReason(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("already checked in on {0}")]
    AlreadySigned(NaiveDate),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("missing asset: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid font file: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("asset read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
