pub mod client;
pub mod models;
pub use client::VRChatClient;
pub use models::{GroupAnnouncement, VRChatError};
