use serenity::async_trait;
use serenity::model::application::Command;
use serenity::model::prelude::*;
use serenity::prelude::*;
use crate::discord::announcements::AnnouncementDispatcher;
use crate::discord::create_announcement;
use std::sync::Arc;
use log::{debug, error, info};

/// Routes gateway interactions: the announcement command opens the form,
/// the form submission goes through the dispatcher. Anything else is ignored.
pub struct EventHandler {
    dispatcher: Arc<AnnouncementDispatcher>,
    guild_id: Option<GuildId>,
}

impl EventHandler {
    pub fn new(dispatcher: Arc<AnnouncementDispatcher>, guild_id: Option<GuildId>) -> Self {
        Self { dispatcher, guild_id }
    }
}

#[async_trait]
impl serenity::client::EventHandler for EventHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ Logged in as {}", ready.user.tag());

        let result = match self.guild_id {
            Some(guild_id) => guild_id
                .set_commands(&ctx.http, vec![create_announcement::register()])
                .await
                .map(|_| format!("guild {}", guild_id)),
            None => Command::create_global_command(&ctx.http, create_announcement::register())
                .await
                .map(|_| "all guilds".to_string()),
        };

        match result {
            Ok(target) => info!("Registered /{} for {}", create_announcement::NAME, target),
            Err(why) => error!("Failed to register /{}: {}", create_announcement::NAME, why),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                if command.data.name != create_announcement::NAME {
                    debug!("Ignoring command /{}", command.data.name);
                    return;
                }

                if let Err(why) = create_announcement::run(&ctx, &command).await {
                    error!("Cannot show announcement form: {}", why);
                }
            }
            Interaction::Modal(modal) => {
                if modal.data.custom_id != create_announcement::MODAL_ID {
                    debug!("Ignoring modal {}", modal.data.custom_id);
                    return;
                }

                let reply = self.dispatcher.handle_submission(
                    &*ctx.http,
                    modal.guild_id,
                    modal.user.id,
                    create_announcement::submitted_fields(&modal),
                ).await;

                if let Err(why) = modal.create_response(&ctx.http, reply.into_response()).await {
                    error!("Cannot respond to announcement submission: {}", why);
                }
            }
            _ => {}
        }
    }
}
