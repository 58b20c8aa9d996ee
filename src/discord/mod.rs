// src/discord/mod.rs
mod client;
mod events;
mod commands;
pub mod roles;
pub mod announcements;
pub use client::DiscordClient;
pub use commands::create_announcement;
pub use events::EventHandler;
