use anyhow::Result;
use serenity::prelude::*;
use tracing::{info, warn, error};

mod assets;
mod bot;
mod checkin;
mod commands;
mod config;
mod data;
mod error;
mod handler;
mod messages;
mod render;
mod rewards;
mod store;
mod utils;

use bot::Bot;
use config::Config;
use handler::Handler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize logging with environment-based configuration
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "daily_sign_bot=info,serenity=warn".to_string())
        )
        .init();

    info!("Starting Daily Sign Bot...");

    let font_path = config.asset_dir.join(render::FONT_FILE);
    match assets::ensure_font(&font_path, config.font_url.as_deref()).await {
        Ok(true) => info!("Font available at {}", font_path.display()),
        Ok(false) => warn!("Font missing, sign cards will fall back to text"),
        Err(e) => warn!("Failed to download font, sign cards will fall back to text: {:#}", e),
    }

    let bot = Bot::new(config).await?;
    info!("Sign storage ready ({:?})", bot.data.config.storage);

    let token = bot.data.config.discord_token.clone();
    let intents = GatewayIntents::GUILDS;

    let handler = Handler {
        data: bot.data.clone(),
    };

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    info!("Bot initialized successfully, connecting to Discord...");

    if let Err(why) = client.start().await {
        error!("Discord client error: {}", why);
        return Err(anyhow::anyhow!("Discord client failed: {}", why));
    }

    Ok(())
}
