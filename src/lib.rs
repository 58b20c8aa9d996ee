pub mod config;
pub mod discord;
pub mod logging;
pub mod vrchat;

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use log::info;
use crate::config::Settings;
use crate::discord::announcements::AnnouncementDispatcher;
use crate::discord::DiscordClient;
use crate::logging::LogLevel;
use crate::vrchat::VRChatClient;

#[derive(Parser, Debug)]
#[command(version, about = "Discord bot that posts announcements locally or to a VRChat group")]
pub struct Cli {
    /// Optional TOML config file, read before the environment
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Overrides LOG_LEVEL
    #[arg(long, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,
}

pub struct BotClients {
    pub discord: DiscordClient,
    pub vrchat: Arc<VRChatClient>,
}

pub async fn init(settings: &Settings) -> Result<BotClients, Box<dyn std::error::Error + Send + Sync>> {
    let vrchat = Arc::new(VRChatClient::new(settings)?);
    info!("VRChat client ready for group {}", settings.group_id);

    let dispatcher = Arc::new(AnnouncementDispatcher::new(vrchat.clone(), settings.allowed_role.clone()));
    info!("Announcements require the \"{}\" role", dispatcher.allowed_role());

    let discord = DiscordClient::new(settings, dispatcher).await?;

    Ok(BotClients { discord, vrchat })
}

pub async fn run(clients: BotClients) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Bot is now running. Press Ctrl+C to exit.");

    tokio::select! {
        result = clients.discord.start() => {
            result?;
            info!("Discord client stopped.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down.");
            clients.discord.shutdown().await;
        }
    }

    info!("Bot has shut down.");
    Ok(())
}
