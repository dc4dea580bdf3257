use serenity::{
    builder::CreateCommand,
    model::application::CommandInteraction,
    prelude::*,
};
use crate::{
    bot::SharedBotData,
    commands::reply_card,
    error::SignError,
    messages,
    rewards::DailyDraw,
    utils::{
        command_helpers::get_user_id,
        responses::{default_response, error_response},
    },
};
use tracing::{info, debug, error};

pub fn sign_command() -> CreateCommand {
    CreateCommand::new("sign")
        .description("Check in for today's coins and fortune")
}

pub fn status_command() -> CreateCommand {
    CreateCommand::new("sign-status")
        .description("Show your streak, balance and last fortune")
}

pub fn ranking_command() -> CreateCommand {
    CreateCommand::new("sign-ranking")
        .description("Show the users with the most coins")
}

pub fn coins_history_command() -> CreateCommand {
    CreateCommand::new("coins-history")
        .description("Show your recent coin changes")
}

pub fn fortune_history_command() -> CreateCommand {
    CreateCommand::new("fortune-history")
        .description("Show your recent fortune draws")
}

pub fn help_command() -> CreateCommand {
    CreateCommand::new("sign-help")
        .description("Explain the daily sign commands")
}

pub async fn sign(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Sign command executed by user {}", command.user.id);

    let user_id = get_user_id(command);
    let today = data.today();
    let draw = DailyDraw::roll(&mut rand::thread_rng());

    match data.signs.check_in(&user_id, today, draw).await {
        Ok(outcome) => reply_card(ctx, command, &data, &messages::sign_success(&outcome)).await,
        Err(SignError::AlreadySigned(date)) => {
            reply_card(ctx, command, &data, &messages::already_signed(date)).await
        }
        Err(e) => {
            error!("Check-in failed for user {}: {}", user_id, e);
            command.create_response(&ctx.http, error_response(messages::SIGN_FAILED)).await
        }
    }
}

pub async fn status(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Sign status command executed by user {}", command.user.id);

    let user_id = get_user_id(command);
    match data.signs.status(&user_id).await {
        Ok(Some(record)) => reply_card(ctx, command, &data, &messages::status(&record)).await,
        Ok(None) => command.create_response(&ctx.http, default_response(messages::NO_RECORD)).await,
        Err(e) => {
            error!("Failed to load sign status for user {}: {}", user_id, e);
            command.create_response(&ctx.http, error_response(messages::LOOKUP_FAILED)).await
        }
    }
}

pub async fn ranking(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Sign ranking command executed by user {}", command.user.id);

    let response = match data.signs.ranking(data.config.ranking_size).await {
        Ok(records) => {
            debug!("Ranking has {} entries", records.len());
            default_response(&messages::ranking(&records))
        }
        Err(e) => {
            error!("Failed to load ranking: {}", e);
            error_response(messages::LOOKUP_FAILED)
        }
    };
    command.create_response(&ctx.http, response).await
}

pub async fn coins_history(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Coins history command executed by user {}", command.user.id);

    let user_id = get_user_id(command);
    let response = match data.signs.coins_history(&user_id, data.config.history_limit).await {
        Ok(entries) => default_response(&messages::coins_history(&entries)),
        Err(e) => {
            error!("Failed to load coin history for user {}: {}", user_id, e);
            error_response(messages::LOOKUP_FAILED)
        }
    };
    command.create_response(&ctx.http, response).await
}

pub async fn fortune_history(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Fortune history command executed by user {}", command.user.id);

    let user_id = get_user_id(command);
    let response = match data.signs.fortune_history(&user_id, data.config.history_limit).await {
        Ok(entries) => default_response(&messages::fortune_history(&entries)),
        Err(e) => {
            error!("Failed to load fortune history for user {}: {}", user_id, e);
            error_response(messages::LOOKUP_FAILED)
        }
    };
    command.create_response(&ctx.http, response).await
}

pub async fn help(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    debug!("Sign help requested by user {}", command.user.id);

    let response = default_response(&messages::help(data.signs.policy()));
    command.create_response(&ctx.http, response).await
}
