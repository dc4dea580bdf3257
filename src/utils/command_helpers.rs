use serenity::{
    model::application::{CommandDataOptionValue, CommandInteraction}
};

/// Extracts the invoking user's ID from a Discord command interaction.
/// 
/// This function never fails as command interactions always have a user.
pub fn get_user_id(command: &CommandInteraction) -> String {
    command.user.id.to_string()
}

fn find_option<'a>(command: &'a CommandInteraction, name: &str) -> serenity::Result<&'a CommandDataOptionValue> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .map(|opt| &opt.value)
        .ok_or_else(|| serenity::Error::Other("Missing required argument"))
}

/// Extracts a user option as a user ID string.
/// 
/// # Example
/// ```rust
/// let target = get_user_option(command, "user")?;
/// ```
pub fn get_user_option(command: &CommandInteraction, name: &str) -> serenity::Result<String> {
    match find_option(command, name)? {
        CommandDataOptionValue::User(id) => Ok(id.to_string()),
        _ => Err(serenity::Error::Other("Argument is not a user")),
    }
}

pub fn get_integer_option(command: &CommandInteraction, name: &str) -> serenity::Result<i64> {
    match find_option(command, name)? {
        CommandDataOptionValue::Integer(value) => Ok(*value),
        _ => Err(serenity::Error::Other("Argument is not an integer")),
    }
}

pub fn get_bool_option(command: &CommandInteraction, name: &str) -> serenity::Result<bool> {
    match find_option(command, name)? {
        CommandDataOptionValue::Boolean(value) => Ok(*value),
        _ => Err(serenity::Error::Other("Argument is not a boolean")),
    }
}

/// Whether the invoking member has administrator permissions in this guild.
/// Always false in DMs.
pub fn is_admin(command: &CommandInteraction) -> bool {
    command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator())
}
