use serenity::builder::{CreateAttachment, CreateInteractionResponse, CreateInteractionResponseMessage};

pub fn default_response(message: &str) -> CreateInteractionResponse {
    let data = CreateInteractionResponseMessage::new().content(message);
    CreateInteractionResponse::Message(data)
}

/// Only visible to the user who ran the command.
pub fn error_response(message: &str) -> CreateInteractionResponse {
    let data = CreateInteractionResponseMessage::new()
        .content(message)
        .ephemeral(true);
    CreateInteractionResponse::Message(data)
}

pub fn attachment_response(attachment: CreateAttachment) -> CreateInteractionResponse {
    let data = CreateInteractionResponseMessage::new().add_file(attachment);
    CreateInteractionResponse::Message(data)
}
