use serenity::{
    async_trait,
    model::{
        application::Interaction,
        gateway::Ready,
    },
    prelude::*,
};
use tracing::{info, error};
use crate::{bot::SharedBotData, commands};

/// Routes gateway events to the sign commands.
pub struct Handler {
    pub data: SharedBotData,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected to {} guild(s)", ready.user.name, ready.guilds.len());

        match commands::register_commands(&ctx).await {
            Ok(()) => info!("Registered sign commands"),
            Err(why) => error!("Failed to register sign commands: {}", why),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let name = match &interaction {
            Interaction::Command(command) => command.data.name.clone(),
            _ => return,
        };

        if let Err(why) = commands::handle_command(&ctx, &interaction, self.data.clone()).await {
            error!("Error handling /{}: {}", name, why);
        }
    }
}
