// src/discord/commands/create_announcement.rs

use serenity::builder::{CreateActionRow, CreateCommand, CreateInputText, CreateInteractionResponse, CreateModal};
use serenity::model::application::{ActionRowComponent, CommandInteraction, InputTextStyle, ModalInteraction};
use serenity::prelude::*;
use crate::discord::announcements::{DESCRIPTION_FIELD, DESCRIPTION_MAX_LEN, SCOPE_FIELD, TITLE_FIELD, TITLE_MAX_LEN};

pub const NAME: &str = "create-announcement";
pub const MODAL_ID: &str = "announceModal";

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Open a form to craft a new announcement.")
}

pub fn modal() -> CreateModal {
    let title = CreateInputText::new(InputTextStyle::Short, "Title", TITLE_FIELD)
        .max_length(TITLE_MAX_LEN)
        .required(true);

    let description = CreateInputText::new(InputTextStyle::Paragraph, "Description", DESCRIPTION_FIELD)
        .max_length(DESCRIPTION_MAX_LEN)
        .required(true);

    let scope = CreateInputText::new(InputTextStyle::Short, "Scope (public or group)", SCOPE_FIELD)
        .placeholder("public or group")
        .required(true);

    CreateModal::new(MODAL_ID, "New Announcement").components(vec![
        CreateActionRow::InputText(title),
        CreateActionRow::InputText(description),
        CreateActionRow::InputText(scope),
    ])
}

/// Answers the command with the announcement form. No role check happens
/// here; that is deferred to submission.
pub async fn run(ctx: &Context, command: &CommandInteraction) -> Result<(), serenity::Error> {
    command.create_response(&ctx.http, CreateInteractionResponse::Modal(modal())).await
}

/// `(custom_id, value)` for every text input in a submitted form.
pub fn submitted_fields(modal: &ModalInteraction) -> Vec<(&str, &str)> {
    modal.data.components.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => Some((input.custom_id.as_str(), input.value.as_deref()?)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn command_has_no_options() {
        let command = serde_json::to_value(register()).unwrap();
        assert_eq!(command["name"], "create-announcement");
        assert_eq!(command["description"], "Open a form to craft a new announcement.");
        assert!(command["options"].as_array().map_or(true, |o| o.is_empty()));
    }

    #[test]
    fn modal_has_three_required_inputs() {
        let modal = serde_json::to_value(modal()).unwrap();
        assert_eq!(modal["custom_id"], MODAL_ID);

        let inputs: Vec<&Value> = modal["components"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|row| row["components"].as_array().unwrap())
            .collect();

        let ids: Vec<&str> = inputs.iter().map(|i| i["custom_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["title", "description", "scope"]);
        assert!(inputs.iter().all(|i| i["required"] == Value::Bool(true)));
        assert_eq!(inputs[2]["placeholder"], "public or group");
        assert_eq!(inputs[0]["max_length"], TITLE_MAX_LEN);
        assert_eq!(inputs[1]["max_length"], DESCRIPTION_MAX_LEN);
    }
}
