pub mod user;
pub mod admin;

use serenity::{
    builder::CreateAttachment,
    model::application::{Command, CommandInteraction, Interaction},
    prelude::*,
};
use crate::{
    bot::{BotState, SharedBotData},
    utils::responses::{attachment_response, default_response},
};
use tracing::warn;

pub async fn register_commands(ctx: &Context) -> serenity::Result<()> {
    let commands = vec![
        user::sign_command(),
        user::status_command(),
        user::ranking_command(),
        user::coins_history_command(),
        user::fortune_history_command(),
        user::help_command(),
        admin::set_coins_command(),
        admin::delete_record_command(),
        admin::delete_all_command(),
    ];

    Command::set_global_commands(&ctx.http, commands).await?;
    Ok(())
}

pub async fn handle_command(
    ctx: &Context,
    interaction: &Interaction,
    data: SharedBotData,
) -> serenity::Result<()> {
    if let Interaction::Command(command) = interaction {
        match command.data.name.as_str() {
            "sign" => user::sign(ctx, command, data).await?,
            "sign-status" => user::status(ctx, command, data).await?,
            "sign-ranking" => user::ranking(ctx, command, data).await?,
            "coins-history" => user::coins_history(ctx, command, data).await?,
            "fortune-history" => user::fortune_history(ctx, command, data).await?,
            "sign-help" => user::help(ctx, command, data).await?,
            "set-coins" => admin::set_coins(ctx, command, data).await?,
            "delete-sign-record" => admin::delete_record(ctx, command, data).await?,
            "delete-all-sign-records" => admin::delete_all(ctx, command, data).await?,
            _ => {
                tracing::warn!("Unknown command: {}", command.data.name);
            }
        }
    }
    Ok(())
}

/// Reply with `text` drawn on the sign card, or as plain text if rendering fails.
pub async fn reply_card(
    ctx: &Context,
    command: &CommandInteraction,
    data: &BotState,
    text: &str,
) -> serenity::Result<()> {
    let response = match data.renderer.render(text, data.config.font_size).await {
        Ok(image) => match CreateAttachment::path(image.path()).await {
            Ok(attachment) => attachment_response(attachment),
            Err(e) => {
                warn!("Failed to attach rendered image, sending text: {}", e);
                default_response(text)
            }
        },
        Err(e) => {
            warn!("Failed to render sign card, sending text: {}", e);
            default_response(text)
        }
    };
    command.create_response(&ctx.http, response).await
}
