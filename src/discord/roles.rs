use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::prelude::*;

/// Looks up the role names a member holds in a guild.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn member_role_names(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<String>, serenity::Error>;
}

#[async_trait]
impl RoleResolver for Http {
    async fn member_role_names(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<String>, serenity::Error> {
        let member = guild_id.member(self, user_id).await?;
        let guild_roles = guild_id.roles(self).await?;

        Ok(member.roles.iter()
            .filter_map(|role_id| guild_roles.get(role_id))
            .map(|role| role.name.clone())
            .collect())
    }
}
