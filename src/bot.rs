use crate::{checkin::SignService, config::Config, render::ImageRenderer, store};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

pub type SharedBotData = Arc<BotState>;

pub struct BotState {
    pub signs: SignService,
    pub renderer: ImageRenderer,
    pub config: Config,
}

impl BotState {
    /// Calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.timezone).date_naive()
    }
}

pub struct Bot {
    pub data: SharedBotData,
}

impl Bot {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = store::open(&config.storage).await?;
        let state = BotState {
            signs: SignService::new(store, config.bonus),
            renderer: ImageRenderer::new(&config.asset_dir),
            config,
        };

        Ok(Self {
            data: Arc::new(state),
        })
    }
}
