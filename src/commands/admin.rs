use serenity::{
    builder::{CreateCommand, CreateCommandOption},
    model::{
        application::{CommandInteraction, CommandOptionType},
        permissions::Permissions,
    },
    prelude::*,
};
use crate::{
    bot::SharedBotData,
    messages,
    utils::{
        command_helpers::{get_bool_option, get_integer_option, get_user_option, is_admin},
        responses::{default_response, error_response},
    },
};
use tracing::{info, warn, error};

const ADMIN_ONLY: &str = "This command requires administrator permissions.";

fn admin_command(name: &str, description: &str) -> CreateCommand {
    CreateCommand::new(name)
        .description(description)
        .default_member_permissions(Permissions::ADMINISTRATOR)
}

pub fn set_coins_command() -> CreateCommand {
    admin_command("set-coins", "Set a user's coin balance (Admin only)")
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to update")
                .required(true)
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "amount", "The new balance")
                .required(true)
        )
}

pub fn delete_record_command() -> CreateCommand {
    admin_command("delete-sign-record", "Delete a user's sign record and history (Admin only)")
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user whose record to delete")
                .required(true)
        )
}

pub fn delete_all_command() -> CreateCommand {
    admin_command("delete-all-sign-records", "Delete every sign record and history (Admin only)")
        .add_option(
            CreateCommandOption::new(CommandOptionType::Boolean, "confirm", "Must be true to proceed")
                .required(true)
        )
}

async fn reject_non_admin(ctx: &Context, command: &CommandInteraction) -> serenity::Result<bool> {
    if is_admin(command) {
        return Ok(false);
    }
    warn!("User {} tried to run admin command {}", command.user.id, command.data.name);
    command.create_response(&ctx.http, error_response(ADMIN_ONLY)).await?;
    Ok(true)
}

pub async fn set_coins(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Set coins command executed by user {}", command.user.id);
    if reject_non_admin(ctx, command).await? {
        return Ok(());
    }

    let target = get_user_option(command, "user")?;
    let amount = get_integer_option(command, "amount")?;

    let response = match data.signs.set_balance(&target, amount).await {
        Ok(change) => default_response(&messages::balance_set(&target, &change)),
        Err(e) => {
            error!("Failed to set balance of user {}: {}", target, e);
            error_response("Failed to update the balance. Please try again.")
        }
    };
    command.create_response(&ctx.http, response).await
}

pub async fn delete_record(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Delete sign record command executed by user {}", command.user.id);
    if reject_non_admin(ctx, command).await? {
        return Ok(());
    }

    let target = get_user_option(command, "user")?;
    let response = match data.signs.delete_user(&target).await {
        Ok(existed) => default_response(&messages::record_deleted(&target, existed)),
        Err(e) => {
            error!("Failed to delete sign record of user {}: {}", target, e);
            error_response("Failed to delete the record. Please try again.")
        }
    };
    command.create_response(&ctx.http, response).await
}

pub async fn delete_all(
    ctx: &Context,
    command: &CommandInteraction,
    data: SharedBotData,
) -> serenity::Result<()> {
    info!("Delete all sign records command executed by user {}", command.user.id);
    if reject_non_admin(ctx, command).await? {
        return Ok(());
    }

    if !get_bool_option(command, "confirm")? {
        let response = error_response("Nothing deleted. Run again with `confirm: True` to delete every record.");
        return command.create_response(&ctx.http, response).await;
    }

    let response = match data.signs.delete_all().await {
        Ok(count) => default_response(&messages::all_records_deleted(count)),
        Err(e) => {
            error!("Failed to delete all sign records: {}", e);
            error_response("Failed to delete records. Please try again.")
        }
    };
    command.create_response(&ctx.http, response).await
}
