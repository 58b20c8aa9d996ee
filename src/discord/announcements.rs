// src/discord/announcements.rs

use crate::discord::roles::RoleResolver;
use crate::vrchat::{GroupAnnouncement, VRChatError};
use async_trait::async_trait;
use log::{error, info, warn};
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::id::{GuildId, UserId};
use std::sync::Arc;
use thiserror::Error;

pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "description";
pub const SCOPE_FIELD: &str = "scope";

/// Input bounds on the form. Chosen so the longest confirmation still fits in
/// one Discord message.
pub const TITLE_MAX_LEN: u16 = 256;
pub const DESCRIPTION_MAX_LEN: u16 = 1700;

/// Discord rejects message content longer than this many characters.
pub const MAX_REPLY_CHARS: usize = 2000;

/// Destination for announcements whose scope is `group`.
#[async_trait]
pub trait GroupAnnouncer: Send + Sync {
    async fn post_announcement(&self, announcement: &GroupAnnouncement) -> Result<(), VRChatError>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnnouncementError {
    #[error("Missing form field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    Group,
}

impl Scope {
    /// Only `group` (any casing) selects the VRChat group. Every other value,
    /// typos included, is treated as a public announcement.
    pub fn parse(value: &str) -> Self {
        if value.to_lowercase() == "group" {
            Scope::Group
        } else {
            Scope::Public
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementSubmission {
    pub title: String,
    pub description: String,
    pub scope: String,
}

impl AnnouncementSubmission {
    /// Builds a submission from `(custom_id, value)` pairs of the modal's
    /// text inputs.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, AnnouncementError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (mut title, mut description, mut scope) = (None, None, None);
        for (custom_id, value) in fields {
            match custom_id {
                TITLE_FIELD => title = Some(value.to_string()),
                DESCRIPTION_FIELD => description = Some(value.to_string()),
                SCOPE_FIELD => scope = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            title: title.ok_or(AnnouncementError::MissingField(TITLE_FIELD))?,
            description: description.ok_or(AnnouncementError::MissingField(DESCRIPTION_FIELD))?,
            scope: scope.ok_or(AnnouncementError::MissingField(SCOPE_FIELD))?,
        })
    }

    pub fn scope(&self) -> Scope {
        Scope::parse(&self.scope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Denied,
}

/// The one message sent back for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self { content: fit_message(content.into()), ephemeral: false }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self { content: fit_message(content.into()), ephemeral: true }
    }

    pub fn into_response(self) -> CreateInteractionResponse {
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(self.content)
                .ephemeral(self.ephemeral),
        )
    }
}

/// Cuts content to [`MAX_REPLY_CHARS`] so the reply is never refused, ending
/// with an ellipsis when anything was dropped.
fn fit_message(content: String) -> String {
    if content.chars().count() <= MAX_REPLY_CHARS {
        return content;
    }
    let mut fitted: String = content.chars().take(MAX_REPLY_CHARS - 1).collect();
    fitted.push('…');
    fitted
}

pub struct AnnouncementDispatcher {
    announcer: Arc<dyn GroupAnnouncer>,
    allowed_role: String,
}

impl AnnouncementDispatcher {
    pub fn new(announcer: Arc<dyn GroupAnnouncer>, allowed_role: impl Into<String>) -> Self {
        Self { announcer, allowed_role: allowed_role.into() }
    }

    pub fn allowed_role(&self) -> &str {
        &self.allowed_role
    }

    pub fn denial(&self) -> Reply {
        Reply::ephemeral(format!("🚫 You need the {} role.", self.allowed_role))
    }

    /// Fresh role lookup for every submission. Lookup failures and DM
    /// submissions (no guild) are denied.
    pub async fn authorize(
        &self,
        roles: &dyn RoleResolver,
        guild_id: Option<GuildId>,
        user_id: UserId,
    ) -> Authorization {
        let Some(guild_id) = guild_id else {
            warn!("Announcement submitted outside a guild by {}", user_id);
            return Authorization::Denied;
        };

        match roles.member_role_names(guild_id, user_id).await {
            Ok(names) if names.iter().any(|name| name == &self.allowed_role) => Authorization::Authorized,
            Ok(_) => Authorization::Denied,
            Err(e) => {
                warn!("Could not resolve roles for {} in guild {}: {}", user_id, guild_id, e);
                Authorization::Denied
            }
        }
    }

    /// Routes an authorized submission and produces its reply.
    pub async fn dispatch(&self, submission: &AnnouncementSubmission) -> Reply {
        match submission.scope() {
            Scope::Group => {
                let announcement = GroupAnnouncement {
                    title: submission.title.clone(),
                    text: submission.description.clone(),
                };
                match self.announcer.post_announcement(&announcement).await {
                    Ok(()) => Reply::public(format!(
                        "✅ Posted to VRChat group:\n**{}**\n{}",
                        submission.title, submission.description
                    )),
                    Err(e) => {
                        error!("VRChat API error: {}", e);
                        Reply::ephemeral(format!("❌ VRChat post failed: {}", e))
                    }
                }
            }
            Scope::Public => Reply::public(format!("📣 **{}**\n{}", submission.title, submission.description)),
        }
    }

    /// Full submission workflow: authorization, field extraction, dispatch.
    /// Always yields exactly one reply.
    pub async fn handle_submission<'a, I>(
        &self,
        roles: &dyn RoleResolver,
        guild_id: Option<GuildId>,
        user_id: UserId,
        fields: I,
    ) -> Reply
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if self.authorize(roles, guild_id, user_id).await == Authorization::Denied {
            info!("Denied announcement from {}: missing role {}", user_id, self.allowed_role);
            return self.denial();
        }

        match AnnouncementSubmission::from_fields(fields) {
            Ok(submission) => {
                info!("Announcement \"{}\" from {} with scope {:?}", submission.title, user_id, submission.scope());
                self.dispatch(&submission).await
            }
            Err(e) => {
                warn!("Malformed announcement form from {}: {}", user_id, e);
                Reply::ephemeral(format!("❌ {}", e))
            }
        }
    }
}
